//! # Rendering Backend Seam
//!
//! The pipeline talks to graphics hardware only through [`RenderBackend`].
//! Backends are confined to the render thread and need not be `Send`.

use image::RgbaImage;

use crate::foundation::math::Vec3;
use crate::scene::SceneModel;
use crate::viewpoint::ViewVector;

use super::RenderResult;

/// Operations the offscreen pipeline consumes from a graphics backend
pub trait RenderBackend {
    /// Upload the geometry of an installed model
    fn load_model(&mut self, model: &SceneModel) -> RenderResult<()>;

    /// Drop every uploaded model
    fn clear_scene(&mut self);

    /// Place the camera at `position` looking at `look_at`
    ///
    /// # Errors
    /// `RenderFailure` when the placement is degenerate.
    fn set_camera(&mut self, position: Vec3, look_at: Vec3) -> RenderResult<()>;

    /// Render the current scene into an offscreen buffer and read it back
    fn render_frame(&mut self) -> RenderResult<RgbaImage>;

    /// Release every backend resource. Later calls fail with `BackendFatal`.
    fn dispose(&mut self);

    /// Size of the offscreen buffer in pixels
    fn extent(&self) -> (u32, u32);
}

/// Renders the current scene from a view vector
///
/// This is the only capability the viewpoint optimizer and strategy selector
/// depend on.
pub trait ViewRenderer {
    /// Render the current scene with the camera at `view.camera_position()`
    /// looking at the origin
    fn render_view(&mut self, view: &ViewVector) -> RenderResult<RgbaImage>;
}

impl<B: RenderBackend + ?Sized> ViewRenderer for B {
    fn render_view(&mut self, view: &ViewVector) -> RenderResult<RgbaImage> {
        self.set_camera(view.camera_position(), Vec3::zeros())?;
        self.render_frame()
    }
}
