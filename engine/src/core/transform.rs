//! Model transform of a renderable or light
//!
//! The matrix is composed on demand from four vectors. Rotation is given in
//! Euler degrees and applied Z, then Y, then X.

use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Translation, rotation, scale and pivot origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform {
    pub translation: Vec3,
    /// Euler angles in degrees
    pub rotation_degrees: Vec3,
    pub scale: Vec3,
    /// Pivot that rotation and scale are applied around
    pub origin: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation_degrees: Vec3::ZERO,
            scale: Vec3::ONE,
            origin: Vec3::ZERO,
        }
    }
}

impl Transform {
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::default()
        }
    }

    pub fn with_rotation_degrees(mut self, degrees: Vec3) -> Self {
        self.rotation_degrees = degrees;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_origin(mut self, origin: Vec3) -> Self {
        self.origin = origin;
        self
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_euler(
            EulerRot::ZYX,
            self.rotation_degrees.z.to_radians(),
            self.rotation_degrees.y.to_radians(),
            self.rotation_degrees.x.to_radians(),
        )
    }

    /// `T(translation) * T(origin) * R * S * T(-origin)`
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_translation(self.translation + self.origin)
            * Mat4::from_quat(self.rotation())
            * Mat4::from_scale(self.scale)
            * Mat4::from_translation(-self.origin)
    }

    /// Inverse-transpose of the model matrix for transforming normals
    pub fn normal_matrix(&self) -> Mat4 {
        self.matrix().inverse().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_identity() {
        assert_eq!(Transform::default().matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn test_scale_then_rotate_then_translate() {
        let transform = Transform::from_translation(Vec3::new(10.0, 0.0, 0.0))
            .with_rotation_degrees(Vec3::new(0.0, 0.0, 90.0))
            .with_scale(Vec3::splat(2.0));

        // (1,0,0) scales to (2,0,0), rotates about Z to (0,2,0), then moves
        let p = transform.matrix().transform_point3(Vec3::X);
        assert!((p - Vec3::new(10.0, 2.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_origin_is_a_fixed_point_of_rotation_and_scale() {
        let origin = Vec3::new(1.0, 2.0, 3.0);
        let transform = Transform::default()
            .with_rotation_degrees(Vec3::new(30.0, 45.0, 60.0))
            .with_scale(Vec3::splat(3.0))
            .with_origin(origin);

        let p = transform.matrix().transform_point3(origin);
        assert!((p - origin).length() < 1e-4);
    }

    #[test]
    fn test_normal_matrix_keeps_normals_perpendicular() {
        let transform = Transform::default().with_scale(Vec3::new(4.0, 1.0, 1.0));
        let normal = transform
            .normal_matrix()
            .transform_vector3(Vec3::new(1.0, 1.0, 0.0).normalize());
        let tangent = transform
            .matrix()
            .transform_vector3(Vec3::new(1.0, -1.0, 0.0).normalize());
        assert!(normal.dot(tangent).abs() < 1e-5);
    }
}
