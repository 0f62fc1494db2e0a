//! Axis-aligned bounding boxes
//!
//! Stored as center plus half-extents, which keeps the separating-axis
//! test down to three subtractions and comparisons.

use crate::foundation::math::{utils, Vec3};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Center of the box
    pub center: Vec3,
    /// Half the box size along each axis (never negative)
    pub half_extents: Vec3,
}

impl AABB {
    /// Create a box from its center and half-extents
    ///
    /// Negative half-extents are folded to their absolute value.
    pub fn new(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            center,
            half_extents: half_extents.abs(),
        }
    }

    /// Create a box spanning two corners
    pub fn from_min_max(min: Vec3, max: Vec3) -> Self {
        Self::new((min + max) * 0.5, (max - min) * 0.5)
    }

    /// Derive a local-space box from mesh extents and the entity's local scale
    pub fn from_mesh_extents(min: Vec3, max: Vec3, scale: Vec3) -> Self {
        let bounds = Self::from_min_max(min, max);
        Self::new(
            bounds.center.component_mul(&scale),
            bounds.half_extents.component_mul(&scale),
        )
    }

    /// Minimum corner
    pub fn min(&self) -> Vec3 {
        self.center - self.half_extents
    }

    /// Maximum corner
    pub fn max(&self) -> Vec3 {
        self.center + self.half_extents
    }

    /// Largest of the three half-extents.
    ///
    /// Used as a bounding-sphere radius stand-in for grid level selection
    /// and query padding.
    pub fn max_half_extent(&self) -> f32 {
        utils::max_component(&self.half_extents)
    }

    /// Same extents, different center
    pub fn with_center(&self, center: Vec3) -> Self {
        Self {
            center,
            half_extents: self.half_extents,
        }
    }

    /// Whether every component is a finite number
    pub fn is_finite(&self) -> bool {
        self.center.iter().chain(self.half_extents.iter()).all(|v| v.is_finite())
    }

    /// Separating-axis overlap test; touching boxes overlap
    pub fn overlaps(&self, other: &AABB) -> bool {
        overlap(self, other)
    }
}

/// Separating-axis overlap test between two boxes.
///
/// The boxes are disjoint exactly when, on some axis, the distance between
/// the centers exceeds the sum of the half-extents.
pub fn overlap(a: &AABB, b: &AABB) -> bool {
    (0..3).all(|axis| {
        (a.center[axis] - b.center[axis]).abs() <= a.half_extents[axis] + b.half_extents[axis]
    })
}
