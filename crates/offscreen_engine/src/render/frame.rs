//! Captured frames

use image::RgbaImage;

use crate::viewpoint::ViewVector;

/// One captured image of a model, seen from one view vector.
///
/// Frames produced by a single submission share `model_id` and carry their
/// position within that group in `view_index` / `view_count`.
#[derive(Debug, Clone)]
pub struct RenderedFrame {
    /// Identifier of the model the frame was rendered from
    pub model_id: String,
    /// View the frame was rendered from
    pub view: ViewVector,
    /// Position of this view among the views selected for the submission
    pub view_index: usize,
    /// Number of views selected for the submission
    pub view_count: usize,
    /// Pixel buffer
    pub image: RgbaImage,
}

impl RenderedFrame {
    /// Width of the pixel buffer
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height of the pixel buffer
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Whether this is the last frame selected for its submission
    pub fn is_last_view(&self) -> bool {
        self.view_index + 1 == self.view_count
    }
}
