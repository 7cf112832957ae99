//! Math utilities and types
//!
//! Provides the vector, matrix and transform types shared by the scene,
//! the camera and the viewpoint subsystem.

pub use nalgebra::{Matrix4, Quaternion, Unit, Vector3};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Tolerance used when checking vectors for degeneracy
pub const EPSILON: f32 = 1.0e-6;

/// Transform representing position, rotation, and scale
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Position in 3D space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with a translation and a uniform scale
    pub fn from_position_scale(position: Vec3, scale: f32) -> Self {
        Self {
            position,
            scale: Vec3::repeat(scale),
            ..Default::default()
        }
    }

    /// Convert to a transformation matrix (translation * rotation * scale)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// Apply this transform to a point
    pub fn transform_point(&self, point: Point3) -> Point3 {
        self.to_matrix().transform_point(&point)
    }
}

/// Returns the normalized vector, or `None` when it is too short or not finite.
pub fn try_normalize(v: Vec3) -> Option<Unit<Vec3>> {
    if !v.iter().all(|c| c.is_finite()) {
        return None;
    }
    Unit::try_new(v, EPSILON)
}

/// Extension trait for Mat4 with camera matrix constructors
pub trait Mat4Ext {
    /// Create a right-handed look-at view matrix. The camera looks down -Z.
    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4;

    /// Create an orthographic projection mapping the view volume to [-1, 1]^3
    fn orthographic(half_width: f32, half_height: f32, near: f32, far: f32) -> Mat4;
}

impl Mat4Ext for Mat4 {
    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
        let forward = (target - eye).normalize();
        let right = forward.cross(&up).normalize();
        let camera_up = right.cross(&forward);

        let translation = Mat4::new(
            1.0, 0.0, 0.0, -eye.x,
            0.0, 1.0, 0.0, -eye.y,
            0.0, 0.0, 1.0, -eye.z,
            0.0, 0.0, 0.0, 1.0,
        );

        let rotation = Mat4::new(
            right.x, right.y, right.z, 0.0,
            camera_up.x, camera_up.y, camera_up.z, 0.0,
            -forward.x, -forward.y, -forward.z, 0.0,
            0.0, 0.0, 0.0, 1.0,
        );

        rotation * translation
    }

    fn orthographic(half_width: f32, half_height: f32, near: f32, far: f32) -> Mat4 {
        let depth = far - near;
        Mat4::new(
            1.0 / half_width, 0.0, 0.0, 0.0,
            0.0, 1.0 / half_height, 0.0, 0.0,
            0.0, 0.0, -2.0 / depth, -(far + near) / depth,
            0.0, 0.0, 0.0, 1.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_look_at_maps_target_onto_negative_z() {
        let view = Mat4::look_at(Vec3::new(0.0, 0.0, 2.0), Vec3::zeros(), Vec3::y());
        let origin = view.transform_point(&Point3::origin());

        assert_relative_eq!(origin.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(origin.y, 0.0, epsilon = 1e-6);
        assert_relative_eq!(origin.z, -2.0, epsilon = 1e-6);
    }

    #[test]
    fn test_orthographic_maps_extent_to_unit_cube() {
        let proj = Mat4::orthographic(2.0, 1.0, 0.5, 4.5);
        let corner = proj.transform_point(&Point3::new(2.0, -1.0, -0.5));

        assert_relative_eq!(corner.x, 1.0, epsilon = 1e-6);
        assert_relative_eq!(corner.y, -1.0, epsilon = 1e-6);
        assert_relative_eq!(corner.z, -1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_transform_scales_before_translating() {
        let transform = Transform::from_position_scale(Vec3::new(1.0, 0.0, 0.0), 2.0);
        let p = transform.transform_point(Point3::new(1.0, 1.0, 1.0));

        assert_relative_eq!(p.coords, Vec3::new(3.0, 2.0, 2.0), epsilon = 1e-6);
    }

    #[test]
    fn test_try_normalize_rejects_degenerate_vectors() {
        assert!(try_normalize(Vec3::zeros()).is_none());
        assert!(try_normalize(Vec3::new(f32::NAN, 1.0, 0.0)).is_none());

        let unit = try_normalize(Vec3::new(3.0, 4.0, 0.0)).unwrap();
        assert_relative_eq!(unit.norm(), 1.0, epsilon = 1e-6);
    }
}
