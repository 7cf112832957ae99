//! Caller side of the pipeline
//!
//! A [`PipelineHandle`] is cheap to clone and may be used from any thread. It
//! never blocks: `submit` enqueues into an unbounded channel and `retrieve`
//! polls the frame channel.

use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};

use crate::render::{RenderError, RenderResult, RenderedFrame};
use crate::scene::Model;

use super::request::RenderRequest;
use super::state::{PipelineState, SharedState};

/// Thread-safe access to an offscreen pipeline
#[derive(Debug, Clone)]
pub struct PipelineHandle {
    requests: Sender<RenderRequest>,
    frames: Receiver<RenderedFrame>,
    shared: Arc<SharedState>,
}

/// Render-thread ends of the two queues
#[derive(Debug)]
pub(crate) struct RenderEnds {
    pub(crate) requests: Receiver<RenderRequest>,
    pub(crate) frames: Sender<RenderedFrame>,
}

/// Create the inbound and outbound queues of a pipeline
pub(crate) fn channels(shared: Arc<SharedState>) -> (PipelineHandle, RenderEnds) {
    let (request_tx, request_rx) = unbounded();
    let (frame_tx, frame_rx) = unbounded();
    (
        PipelineHandle {
            requests: request_tx,
            frames: frame_rx,
            shared,
        },
        RenderEnds {
            requests: request_rx,
            frames: frame_tx,
        },
    )
}

impl PipelineHandle {
    /// Queue `model` for rendering with the configured strategy
    ///
    /// # Errors
    /// `PipelineClosed` once the pipeline is disposed or disposing.
    pub fn submit(&self, model: impl Into<Arc<Model>>) -> RenderResult<()> {
        self.submit_request(RenderRequest::new(model))
    }

    /// Queue a request
    ///
    /// # Errors
    /// `PipelineClosed` once the pipeline is disposed or disposing;
    /// `InvalidInput` for an explicit view list that is empty.
    pub fn submit_request(&self, request: RenderRequest) -> RenderResult<()> {
        if self.shared.is_closed() {
            return Err(RenderError::PipelineClosed);
        }
        request.validate()?;

        log::trace!("Submitting model '{}'", request.model_id());
        self.requests
            .send(request)
            .map_err(|_| RenderError::PipelineClosed)
    }

    /// Take the oldest rendered frame, if one is ready
    ///
    /// # Errors
    /// `PipelineClosed` once the pipeline is disposed or disposing, or when
    /// the render side is gone.
    pub fn retrieve(&self) -> RenderResult<Option<RenderedFrame>> {
        if self.shared.is_closed() {
            return Err(RenderError::PipelineClosed);
        }

        match self.frames.try_recv() {
            Ok(frame) => Ok(Some(frame)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(RenderError::PipelineClosed),
        }
    }

    /// Ask the render side to stop.
    ///
    /// Takes effect at the start of the next render cycle; an in-flight cycle
    /// completes first. Handle operations fail with `PipelineClosed` from now on.
    pub fn dispose(&self) {
        if !self.shared.dispose_requested() {
            log::info!("Pipeline dispose requested");
        }
        self.shared.request_dispose();
    }

    /// Current pipeline state
    pub fn state(&self) -> PipelineState {
        self.shared.state()
    }

    /// Whether the pipeline is disposed or disposing
    pub fn is_closed(&self) -> bool {
        self.shared.is_closed()
    }

    /// Number of submissions not yet picked up by the render loop
    pub fn pending_requests(&self) -> usize {
        self.requests.len()
    }

    /// Number of frames ready to be retrieved
    pub fn ready_frames(&self) -> usize {
        self.frames.len()
    }
}
