//! Render-thread side of the pipeline

use std::sync::Arc;

use crate::core::config::PipelineConfig;
use crate::engine::Engine;
use crate::render::{RenderBackend, RenderError, RenderResult};
use crate::viewpoint::ViewpointSelector;

use super::handle::{channels, PipelineHandle};
use super::logic::PipelineLogic;
use super::state::{PipelineState, SharedState};

/// What a call to [`OffscreenRenderer::run_cycle`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleReport {
    /// No submission was waiting
    Idle,
    /// One submission was processed
    Rendered {
        /// Identifier of the processed model
        model_id: String,
        /// Number of frames enqueued for it
        frames: usize,
    },
    /// The pipeline is stopped; no further cycles will run
    Stopped,
}

/// # Offscreen Renderer
///
/// Owns the render engine and must stay on the thread that created its
/// backend. Callers on other threads talk to it through
/// [`PipelineHandle`]s obtained from [`OffscreenRenderer::handle`].
pub struct OffscreenRenderer<B: RenderBackend> {
    engine: Engine<B, PipelineLogic>,
    handle: PipelineHandle,
    shared: Arc<SharedState>,
}

impl<B: RenderBackend> OffscreenRenderer<B> {
    /// Create a pipeline rendering with `backend`
    ///
    /// # Errors
    /// `InvalidInput` when the configuration does not validate.
    pub fn new(config: PipelineConfig, backend: B) -> RenderResult<Self> {
        config.validate().map_err(RenderError::InvalidInput)?;

        let expected = (config.window.width, config.window.height);
        if backend.extent() != expected {
            log::warn!(
                "Backend extent {:?} differs from configured {:?}",
                backend.extent(),
                expected
            );
        }

        let selector = ViewpointSelector::from_config(&config)?;
        let shared = Arc::new(SharedState::new());
        let (handle, ends) = channels(Arc::clone(&shared));
        let logic = PipelineLogic::new(
            ends,
            Arc::clone(&shared),
            selector,
            config.viewpoint.strategy,
        );
        let engine = Engine::new(backend, logic)?;

        Ok(Self {
            engine,
            handle,
            shared,
        })
    }

    /// A new handle for submitting models and retrieving frames
    pub fn handle(&self) -> PipelineHandle {
        self.handle.clone()
    }

    /// Current state
    pub fn state(&self) -> PipelineState {
        self.shared.state()
    }

    /// The backend
    pub fn backend(&self) -> &B {
        self.engine.backend()
    }

    /// Run one render cycle.
    ///
    /// Processes at most one queued submission and enqueues one frame per
    /// selected view. A dispose requested through a handle takes effect here,
    /// before anything else.
    ///
    /// # Errors
    /// `BackendFatal` when the backend is lost; the pipeline is stopped first.
    pub fn run_cycle(&mut self) -> RenderResult<CycleReport> {
        if self.shared.state() == PipelineState::Stopped {
            return Ok(CycleReport::Stopped);
        }
        if self.shared.dispose_requested() {
            self.dispose();
            return Ok(CycleReport::Stopped);
        }

        match self.engine.run_once() {
            Ok(()) => Ok(self.engine.logic_mut().take_report()),
            Err(RenderError::PipelineClosed) => {
                self.dispose();
                Ok(CycleReport::Stopped)
            }
            Err(error) if error.is_fatal() => {
                log::error!("Render cycle failed, stopping pipeline: {}", error);
                self.dispose();
                Err(error)
            }
            Err(error) => {
                log::warn!("Render cycle failed: {}", error);
                self.shared.set_state(PipelineState::Idle);
                Ok(self.engine.logic_mut().take_report())
            }
        }
    }

    /// Stop the pipeline and release the backend.
    ///
    /// Pending submissions are discarded. Calling this again has no effect.
    pub fn dispose(&mut self) {
        self.shared.request_dispose();
        self.engine.clear();
        self.shared.set_state(PipelineState::Stopped);
    }
}

impl<B: RenderBackend> Drop for OffscreenRenderer<B> {
    fn drop(&mut self) {
        self.dispose();
    }
}
