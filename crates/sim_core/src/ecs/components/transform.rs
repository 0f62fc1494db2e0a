//! Transform component for scene entities
//!
//! Pure data component. The physics core reads an entity's world matrix and
//! its inverse through this type when testing colliders in local space.

use crate::foundation::math::{Mat4, Quat, Vec3};

/// World-space transformation of an entity
///
/// Y-up right-handed conventions. Scale is applied once, when the entity's
/// collider is built from its mesh extents; the physics frame of the entity
/// is therefore the rigid part (translation and rotation) of this transform.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformComponent {
    /// World space position
    pub position: Vec3,

    /// World space rotation quaternion
    pub rotation: Quat,

    /// Local scale factors
    pub scale: Vec3,
}

impl Default for TransformComponent {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl TransformComponent {
    /// Create identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create from position only
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Builder pattern: Set rotation from quaternion
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Builder pattern: Set rotation from axis-angle
    pub fn with_rotation_axis_angle(mut self, axis: Vec3, angle: f32) -> Self {
        self.rotation = Quat::from_axis_angle(&nalgebra::Unit::new_normalize(axis), angle);
        self
    }

    /// Builder pattern: Set scale (uniform)
    pub fn with_uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::new(scale, scale, scale);
        self
    }

    /// Builder pattern: Set scale (non-uniform)
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Full TRS matrix, as used by rendering
    pub fn to_matrix(&self) -> Mat4 {
        self.world_matrix() * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// World matrix of the physics frame (translation * rotation)
    pub fn world_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position) * self.rotation.to_homogeneous()
    }

    /// Inverse of [`Self::world_matrix`]
    ///
    /// Computed from the decomposed parts, so it never fails.
    pub fn inverse_world_matrix(&self) -> Mat4 {
        self.rotation.inverse().to_homogeneous() * Mat4::new_translation(&(-self.position))
    }

    /// Move by a world-space offset
    pub fn translate(&mut self, delta: Vec3) {
        self.position += delta;
    }

    /// Rotate by a scaled-axis vector (axis * angle), applied in world space
    pub fn rotate_scaled_axis(&mut self, scaled_axis: Vec3) {
        if scaled_axis.norm_squared() > 0.0 {
            self.rotation = Quat::from_scaled_axis(scaled_axis) * self.rotation;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::utils::transform_position;
    use approx::assert_relative_eq;
    use std::f32::consts::PI;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_transform_identity() {
        let transform = TransformComponent::identity();

        assert_eq!(transform.position, Vec3::zeros());
        assert_relative_eq!(transform.rotation, Quat::identity(), epsilon = EPSILON);
        assert_eq!(transform.scale, Vec3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_world_matrix_inverse() {
        let transform = TransformComponent::from_position(Vec3::new(3.0, -2.0, 7.5))
            .with_rotation_axis_angle(Vec3::new(1.0, 1.0, 0.0), 0.7)
            .with_uniform_scale(3.0);

        let product = transform.world_matrix() * transform.inverse_world_matrix();
        assert_relative_eq!(product, Mat4::identity(), epsilon = EPSILON);
    }

    #[test]
    fn test_world_matrix_excludes_scale() {
        let transform = TransformComponent::from_position(Vec3::new(1.0, 0.0, 0.0))
            .with_uniform_scale(5.0);

        let moved = transform_position(&transform.world_matrix(), &Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(moved, Vec3::new(2.0, 0.0, 0.0), epsilon = EPSILON);

        let scaled = transform_position(&transform.to_matrix(), &Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(scaled, Vec3::new(6.0, 0.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_inverse_brings_world_point_into_local_space() {
        // 90 degrees about Y maps local +X onto world -Z
        let transform = TransformComponent::from_position(Vec3::new(10.0, 0.0, 0.0))
            .with_rotation(Quat::from_axis_angle(&Vec3::y_axis(), PI / 2.0));

        let local = transform_position(&transform.inverse_world_matrix(), &Vec3::new(10.0, 0.0, -2.0));
        assert_relative_eq!(local, Vec3::new(2.0, 0.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_translate_and_rotate() {
        let mut transform = TransformComponent::identity();
        transform.translate(Vec3::new(0.5, 0.0, -1.0));
        transform.rotate_scaled_axis(Vec3::new(0.0, PI, 0.0));

        assert_relative_eq!(transform.position, Vec3::new(0.5, 0.0, -1.0), epsilon = EPSILON);
        let forward = transform.rotation * Vec3::new(0.0, 0.0, -1.0);
        assert_relative_eq!(forward, Vec3::new(0.0, 0.0, 1.0), epsilon = EPSILON);
    }
}
