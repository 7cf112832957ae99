//! # Rendering System
//!
//! Backend-agnostic rendering seam of the offscreen pipeline.
//!
//! ## Architecture
//!
//! - **RenderBackend**: the operations the pipeline consumes from a graphics
//!   backend (load, clear, camera, render, dispose)
//! - **ViewRenderer**: "render the current scene from this view vector", the
//!   only capability the viewpoint subsystem needs
//! - **Camera**: orthographic look-at camera shared by backends
//! - **SoftwareBackend**: CPU reference rasterizer used headless and in tests

pub mod backend;
pub mod camera;
pub mod frame;
pub mod software;

pub use backend::{RenderBackend, ViewRenderer};
pub use camera::Camera;
pub use frame::RenderedFrame;
pub use software::SoftwareBackend;

use thiserror::Error;

/// Rendering system errors
///
/// Every failure of the pipeline falls into one of four classes. Only
/// `PipelineClosed` and `BackendFatal` are ever surfaced to callers as hard
/// failures; the other two are absorbed inside a render cycle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// Degenerate image or model data
    ///
    /// Recovered locally with a zero score or a placeholder entity.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The backend could not produce a frame for a camera placement
    #[error("Render failed: {0}")]
    RenderFailure(String),

    /// Operation attempted after the pipeline was disposed
    #[error("Pipeline is closed")]
    PipelineClosed,

    /// Unrecoverable backend loss; the render loop halts
    #[error("Backend fatal error: {0}")]
    BackendFatal(String),
}

impl RenderError {
    /// Whether the error terminates the current pipeline
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::BackendFatal(_) | Self::PipelineClosed)
    }

    /// Whether the error may be absorbed by retrying or falling back
    pub fn is_recoverable(&self) -> bool {
        !self.is_fatal()
    }
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(RenderError::PipelineClosed.is_fatal());
        assert!(RenderError::BackendFatal("lost".into()).is_fatal());
        assert!(RenderError::RenderFailure("miss".into()).is_recoverable());
        assert!(RenderError::InvalidInput("empty".into()).is_recoverable());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(RenderError::PipelineClosed.to_string(), "Pipeline is closed");
        assert_eq!(
            RenderError::RenderFailure("no geometry".into()).to_string(),
            "Render failed: no geometry"
        );
    }
}
