//! Pipeline state shared between the render thread and its handles

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// Observable state of an offscreen pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PipelineState {
    /// Waiting for a submission
    Idle = 0,
    /// Installing a submitted model into the scene
    Loading = 1,
    /// Rendering the views of the installed model
    Rendering = 2,
    /// Disposed; every resource is released
    Stopped = 3,
}

impl PipelineState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Idle,
            1 => Self::Loading,
            2 => Self::Rendering,
            _ => Self::Stopped,
        }
    }
}

/// State flags readable from any thread
#[derive(Debug)]
pub(crate) struct SharedState {
    state: AtomicU8,
    dispose_requested: AtomicBool,
}

impl SharedState {
    pub(crate) fn new() -> Self {
        Self {
            state: AtomicU8::new(PipelineState::Idle as u8),
            dispose_requested: AtomicBool::new(false),
        }
    }

    pub(crate) fn state(&self) -> PipelineState {
        PipelineState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Transitions out of `Stopped` are ignored.
    pub(crate) fn set_state(&self, next: PipelineState) {
        let _ = self
            .state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                (current != PipelineState::Stopped as u8).then_some(next as u8)
            });
    }

    pub(crate) fn request_dispose(&self) {
        self.dispose_requested.store(true, Ordering::Release);
    }

    pub(crate) fn dispose_requested(&self) -> bool {
        self.dispose_requested.load(Ordering::Acquire)
    }

    /// Whether caller operations must fail with `PipelineClosed`
    pub(crate) fn is_closed(&self) -> bool {
        self.dispose_requested() || self.state() == PipelineState::Stopped
    }
}
