//! Math utilities and types
//!
//! Provides the fundamental nalgebra aliases used by the simulation core.

pub use nalgebra::{Matrix4, Quaternion, Unit, Vector3};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Math utility functions
pub mod utils {
    use super::{Mat4, Point3, Vec3};

    /// Apply a homogeneous matrix to a position given as a vector
    pub fn transform_position(matrix: &Mat4, position: &Vec3) -> Vec3 {
        matrix.transform_point(&Point3::from(*position)).coords
    }

    /// Largest of the three components
    pub fn max_component(v: &Vec3) -> f32 {
        v.x.max(v.y).max(v.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_transform_position_applies_translation() {
        let matrix = Mat4::new_translation(&Vec3::new(1.0, -2.0, 3.0));
        let moved = utils::transform_position(&matrix, &Vec3::new(1.0, 1.0, 1.0));
        assert_relative_eq!(moved, Vec3::new(2.0, -1.0, 4.0), epsilon = 1e-6);
    }

    #[test]
    fn test_max_component() {
        assert_eq!(utils::max_component(&Vec3::new(0.5, 3.0, -4.0)), 3.0);
    }
}
