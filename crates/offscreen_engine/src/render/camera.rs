//! # Offscreen Camera
//!
//! Orthographic look-at camera used to frame an origin-centred model.
//!
//! ## Coordinate System
//! Right-handed, Y-up world space. In view space the camera looks down -Z with
//! +X to the right and +Y up.

use crate::foundation::math::{try_normalize, Mat4, Mat4Ext, Vec3};

use super::{RenderError, RenderResult};

/// Up vectors tried in order when orienting the camera
const UP_CANDIDATES: [Vec3; 2] = [Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 0.0, -1.0)];

/// Minimum |sin| between the view direction and an up candidate
const PARALLEL_TOLERANCE: f32 = 1.0e-3;

/// Camera with an orthographic projection
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Camera position in world space
    pub position: Vec3,

    /// Point the camera is looking at in world space
    pub target: Vec3,

    /// Up vector for camera orientation
    pub up: Vec3,

    /// Half of the vertical extent of the view volume
    pub half_height: f32,

    /// Aspect ratio (width / height)
    pub aspect: f32,

    /// Distance to near clipping plane
    pub near: f32,

    /// Distance to far clipping plane
    pub far: f32,
}

impl Camera {
    /// Create an orthographic camera at `(0, 0, 1)` looking at the origin
    ///
    /// The clipping planes are re-fitted on every [`Camera::place`].
    pub fn orthographic(half_height: f32, aspect: f32) -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 1.0),
            target: Vec3::zeros(),
            up: Vec3::y(),
            half_height,
            aspect,
            near: 0.01,
            far: 2.0,
        }
    }

    /// Place the camera at `position` looking at `target`.
    ///
    /// Keeps world +Y up unless the view direction is parallel to it, in which
    /// case -Z is used. Near and far planes are fitted so that a unit sphere
    /// around the target is never clipped.
    ///
    /// # Errors
    /// `RenderFailure` when the position coincides with the target or either
    /// is not finite.
    pub fn place(&mut self, position: Vec3, target: Vec3) -> RenderResult<()> {
        let offset = position - target;
        let forward = try_normalize(-offset).ok_or_else(|| {
            RenderError::RenderFailure(format!(
                "degenerate camera placement at {:?} looking at {:?}",
                position, target
            ))
        })?;

        let up = UP_CANDIDATES
            .iter()
            .copied()
            .find(|up| forward.cross(up).norm() > PARALLEL_TOLERANCE)
            .ok_or_else(|| RenderError::RenderFailure("no usable up vector".to_string()))?;

        let distance = offset.norm();
        self.position = position;
        self.target = target;
        self.up = up;
        self.near = (distance - 1.0).max(1.0e-3);
        self.far = distance + 1.0;
        log::trace!("Camera placed at {:?} (up {:?})", position, up);
        Ok(())
    }

    /// Generate view matrix for world-to-camera space transformation
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at(self.position, self.target, self.up)
    }

    /// Generate orthographic projection matrix
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::orthographic(
            self.half_height * self.aspect,
            self.half_height,
            self.near,
            self.far,
        )
    }

    /// Combined view-projection matrix
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Unit direction the camera looks in
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Point3;
    use approx::assert_relative_eq;

    #[test]
    fn test_place_rejects_degenerate_position() {
        let mut camera = Camera::orthographic(0.6, 1.0);
        let result = camera.place(Vec3::zeros(), Vec3::zeros());
        assert!(matches!(result, Err(RenderError::RenderFailure(_))));
    }

    #[test]
    fn test_place_looking_down_y_uses_fallback_up() {
        let mut camera = Camera::orthographic(0.6, 1.0);
        camera.place(Vec3::new(0.0, 1.0, 0.0), Vec3::zeros()).unwrap();
        assert_relative_eq!(camera.up, Vec3::new(0.0, 0.0, -1.0));

        let m = camera.view_matrix();
        assert!(m.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_origin_projects_to_center() {
        let mut camera = Camera::orthographic(0.6, 2.0);
        camera.place(Vec3::new(1.0, 1.0, 1.0), Vec3::zeros()).unwrap();

        let ndc = camera
            .view_projection_matrix()
            .transform_point(&Point3::origin());
        assert_relative_eq!(ndc.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(ndc.y, 0.0, epsilon = 1e-5);
        assert!(ndc.z > -1.0 && ndc.z < 1.0);
    }
}
