//! Dedicated render thread
//!
//! Graphics contexts are bound to the thread that created them, so the
//! backend is constructed on the render thread by a caller-supplied factory.
//! The loop runs cycles until the pipeline stops.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::core::config::PipelineConfig;
use crate::pipeline::{CycleReport, OffscreenRenderer, PipelineHandle};
use crate::render::{RenderBackend, RenderError, RenderResult};

/// A running render thread
#[derive(Debug)]
pub struct RenderLoop {
    handle: PipelineHandle,
    thread: Option<JoinHandle<()>>,
}

impl RenderLoop {
    /// Start a render thread.
    ///
    /// `make_backend` runs on the new thread. Start-up failures, from the
    /// factory or from an invalid configuration, are returned from here.
    ///
    /// # Errors
    /// The factory's error, `InvalidInput` for a bad configuration, or
    /// `BackendFatal` when the thread cannot be started.
    pub fn spawn<B, F>(config: PipelineConfig, make_backend: F) -> RenderResult<Self>
    where
        B: RenderBackend + 'static,
        F: FnOnce(&PipelineConfig) -> RenderResult<B> + Send + 'static,
    {
        let (ready_tx, ready_rx) = crossbeam_channel::bounded(1);
        let idle = Duration::from_millis(config.engine.idle_poll_ms);

        let thread = thread::Builder::new()
            .name("offscreen-render".to_string())
            .spawn(move || {
                let started = make_backend(&config)
                    .and_then(|backend| OffscreenRenderer::new(config, backend));
                let mut renderer = match started {
                    Ok(renderer) => renderer,
                    Err(error) => {
                        let _ = ready_tx.send(Err(error));
                        return;
                    }
                };
                if ready_tx.send(Ok(renderer.handle())).is_err() {
                    return;
                }

                log::info!("Render loop started");
                loop {
                    match renderer.run_cycle() {
                        Ok(CycleReport::Idle) => thread::sleep(idle),
                        Ok(CycleReport::Rendered { model_id, frames }) => {
                            log::trace!("Cycle rendered {} frames of '{}'", frames, model_id);
                        }
                        Ok(CycleReport::Stopped) => break,
                        Err(error) => {
                            log::error!("Render loop halted: {}", error);
                            break;
                        }
                    }
                }
                log::info!("Render loop exited");
            })
            .map_err(|e| {
                RenderError::BackendFatal(format!("failed to start render thread: {}", e))
            })?;

        let handle = ready_rx.recv().map_err(|_| {
            RenderError::BackendFatal("render thread exited during start-up".to_string())
        })??;

        Ok(Self {
            handle,
            thread: Some(thread),
        })
    }

    /// A new handle to the pipeline run by this loop
    pub fn handle(&self) -> PipelineHandle {
        self.handle.clone()
    }

    /// Whether the render thread is still running
    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Dispose the pipeline and wait for the render thread to exit.
    ///
    /// # Errors
    /// `BackendFatal` when the render thread panicked.
    pub fn shutdown(mut self) -> RenderResult<()> {
        self.stop()
    }

    fn stop(&mut self) -> RenderResult<()> {
        self.handle.dispose();
        match self.thread.take() {
            Some(thread) => thread
                .join()
                .map_err(|_| RenderError::BackendFatal("render thread panicked".to_string())),
            None => Ok(()),
        }
    }
}

impl Drop for RenderLoop {
    fn drop(&mut self) {
        if let Err(error) = self.stop() {
            log::error!("Render loop shutdown failed: {}", error);
        }
    }
}
