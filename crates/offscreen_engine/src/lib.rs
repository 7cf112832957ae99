//! # Offscreen Engine
//!
//! Renders 3D models offscreen into images for indexing and thumbnails.
//!
//! ## Features
//!
//! - **Queue-based pipeline**: submit models and retrieve frames from any
//!   thread while a single render thread owns the graphics backend
//! - **Viewpoint selection**: fixed, random, multi-view and entropy-maximising
//!   camera placement
//! - **Headless backend**: CPU rasterizer for environments without a GPU
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use offscreen_engine::prelude::*;
//!
//! fn main() -> Result<(), RenderError> {
//!     let config = PipelineConfig::with_strategy(ViewpointStrategy::MultiViewFixedSet);
//!     let render_loop = RenderLoop::spawn(config, |config| SoftwareBackend::new(&config.window))?;
//!     let handle = render_loop.handle();
//!
//!     handle.submit(Model::placeholder_cube("cube"))?;
//!     let mut frames = Vec::new();
//!     while frames.len() < 12 {
//!         if let Some(frame) = handle.retrieve()? {
//!             frames.push(frame);
//!         }
//!     }
//!
//!     render_loop.shutdown()
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod core;
pub mod engine;
pub mod foundation;
pub mod pipeline;
pub mod preview;
pub mod render;
pub mod scene;
pub mod viewpoint;

/// Common imports for pipeline users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError},
        core::config::{PipelineConfig, WindowOptions},
        engine::{Engine, EngineLogic, RenderLoop},
        foundation::math::{Transform, Vec3},
        pipeline::{
            CycleReport, OffscreenRenderer, PipelineHandle, PipelineState, RenderRequest,
            ViewSelection,
        },
        render::{
            RenderBackend, RenderError, RenderResult, RenderedFrame, SoftwareBackend,
            ViewRenderer,
        },
        scene::{Entity, Mesh, Model},
        viewpoint::{ViewVector, ViewpointStrategy},
    };
}
