//! Engine hooks of the offscreen pipeline
//!
//! One cycle loads at most one queued request:
//! `before_render` dequeues and installs it, `update` recomputes transforms
//! and uploads the scene, `after_render` selects views and captures a frame
//! per view.

use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender, TryRecvError};

use crate::engine::EngineLogic;
use crate::render::{RenderBackend, RenderResult, RenderedFrame, ViewRenderer};
use crate::scene::Scene;
use crate::viewpoint::{ViewVector, ViewpointSelector, ViewpointStrategy};

use super::handle::RenderEnds;
use super::renderer::CycleReport;
use super::request::{RenderRequest, ViewSelection};
use super::state::{PipelineState, SharedState};

pub(crate) struct PipelineLogic {
    requests: Receiver<RenderRequest>,
    frames: Sender<RenderedFrame>,
    shared: Arc<SharedState>,
    selector: ViewpointSelector,
    default_strategy: ViewpointStrategy,
    loaded: Option<RenderRequest>,
    report: CycleReport,
}

impl PipelineLogic {
    pub(crate) fn new(
        ends: RenderEnds,
        shared: Arc<SharedState>,
        selector: ViewpointSelector,
        default_strategy: ViewpointStrategy,
    ) -> Self {
        Self {
            requests: ends.requests,
            frames: ends.frames,
            shared,
            selector,
            default_strategy,
            loaded: None,
            report: CycleReport::Idle,
        }
    }

    /// Outcome of the last cycle; resets to `Idle`
    pub(crate) fn take_report(&mut self) -> CycleReport {
        std::mem::replace(&mut self.report, CycleReport::Idle)
    }

    fn views_for<B: RenderBackend>(
        &mut self,
        selection: &ViewSelection,
        backend: &mut B,
    ) -> RenderResult<Vec<ViewVector>> {
        match selection {
            ViewSelection::Configured => self.selector.select_views(self.default_strategy, backend),
            ViewSelection::Strategy(strategy) => self.selector.select_views(*strategy, backend),
            ViewSelection::Explicit(views) => Ok(views.clone()),
        }
    }
}

impl<B: RenderBackend> EngineLogic<B> for PipelineLogic {
    fn init(&mut self, backend: &mut B, _scene: &mut Scene) -> RenderResult<()> {
        let (width, height) = backend.extent();
        log::info!(
            "Offscreen pipeline ready ({}x{}, strategy {:?})",
            width,
            height,
            self.default_strategy
        );
        self.shared.set_state(PipelineState::Idle);
        Ok(())
    }

    fn before_render(&mut self, backend: &mut B, scene: &mut Scene) -> RenderResult<()> {
        self.report = CycleReport::Idle;
        let request = match self.requests.try_recv() {
            Ok(request) => request,
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => return Ok(()),
        };

        self.shared.set_state(PipelineState::Loading);
        log::debug!("Loading model '{}'", request.model_id());

        backend.clear_scene();
        scene.install(Arc::clone(&request.model));
        self.loaded = Some(request);
        Ok(())
    }

    fn update(&mut self, backend: &mut B, scene: &mut Scene) -> RenderResult<()> {
        let Some(request) = self.loaded.as_ref() else {
            return Ok(());
        };

        scene.update_transforms();
        let Some(installed) = scene.current() else {
            return Ok(());
        };

        if let Err(error) = backend.load_model(installed) {
            if error.is_fatal() {
                return Err(error);
            }
            log::warn!("Backend rejected model '{}': {}", request.model_id(), error);
            self.report = CycleReport::Rendered {
                model_id: request.model_id().to_string(),
                frames: 0,
            };
            self.loaded = None;
            self.shared.set_state(PipelineState::Idle);
        }
        Ok(())
    }

    fn after_render(&mut self, backend: &mut B, _scene: &mut Scene) -> RenderResult<()> {
        let Some(request) = self.loaded.take() else {
            return Ok(());
        };
        self.shared.set_state(PipelineState::Rendering);

        let views = self.views_for(&request.views, backend)?;
        let view_count = views.len();
        let mut frames = 0;

        for (view_index, view) in views.into_iter().enumerate() {
            match backend.render_view(&view) {
                Ok(image) => {
                    let frame = RenderedFrame {
                        model_id: request.model_id().to_string(),
                        view,
                        view_index,
                        view_count,
                        image,
                    };
                    if self.frames.send(frame).is_err() {
                        log::warn!("No receiver left for frames, disposing pipeline");
                        self.shared.request_dispose();
                        break;
                    }
                    frames += 1;
                }
                Err(error) if error.is_fatal() => return Err(error),
                Err(error) => {
                    log::warn!(
                        "View {}/{} of '{}' failed, skipping: {}",
                        view_index + 1,
                        view_count,
                        request.model_id(),
                        error
                    );
                }
            }
        }

        log::debug!(
            "Rendered {}/{} views of '{}'",
            frames,
            view_count,
            request.model_id()
        );
        self.report = CycleReport::Rendered {
            model_id: request.model_id().to_string(),
            frames,
        };
        self.shared.set_state(PipelineState::Idle);
        Ok(())
    }

    fn cleanup(&mut self) {
        let discarded = self.requests.try_iter().count();
        if discarded > 0 {
            log::warn!("Discarded {} pending submissions on dispose", discarded);
        }
        self.loaded = None;
    }
}
