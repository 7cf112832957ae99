//! # Render Engine
//!
//! Single-threaded cooperative render loop. An [`Engine`] owns the backend,
//! the scene and an [`EngineLogic`] whose hooks it invokes in a fixed order
//! once per cycle. The driver calling [`Engine::run_once`] decides how often
//! cycles happen.

pub mod render_loop;

pub use render_loop::RenderLoop;

use crate::render::{RenderBackend, RenderError, RenderResult};
use crate::scene::Scene;

/// Engine lifecycle hooks
///
/// Implement this trait to drive the engine. `init` runs once when the engine
/// is created, the three render hooks run in order on every cycle, and
/// `cleanup` runs once when the engine is cleared.
pub trait EngineLogic<B: RenderBackend> {
    /// Called once after the backend is created
    fn init(&mut self, backend: &mut B, scene: &mut Scene) -> RenderResult<()>;

    /// Called first on every cycle; prepares the scene
    fn before_render(&mut self, backend: &mut B, scene: &mut Scene) -> RenderResult<()>;

    /// Called after `before_render`; synchronises scene state with the backend
    fn update(&mut self, backend: &mut B, scene: &mut Scene) -> RenderResult<()>;

    /// Called last on every cycle; renders and captures frames
    fn after_render(&mut self, backend: &mut B, scene: &mut Scene) -> RenderResult<()>;

    /// Called once before the backend is disposed
    fn cleanup(&mut self);
}

/// Render engine owning backend, scene and logic
pub struct Engine<B: RenderBackend, L: EngineLogic<B>> {
    backend: B,
    scene: Scene,
    logic: L,
    cycles: u64,
    disposed: bool,
}

impl<B: RenderBackend, L: EngineLogic<B>> Engine<B, L> {
    /// Create an engine and run the logic's `init` hook
    pub fn new(mut backend: B, mut logic: L) -> RenderResult<Self> {
        let mut scene = Scene::new();
        if let Err(error) = logic.init(&mut backend, &mut scene) {
            backend.dispose();
            return Err(error);
        }

        log::info!("Render engine initialized");
        Ok(Self {
            backend,
            scene,
            logic,
            cycles: 0,
            disposed: false,
        })
    }

    /// Run one cycle: `before_render`, `update`, `after_render`.
    ///
    /// # Errors
    /// `PipelineClosed` once the engine has been cleared; otherwise the first
    /// error returned by a hook, which ends the cycle.
    pub fn run_once(&mut self) -> RenderResult<()> {
        if self.disposed {
            return Err(RenderError::PipelineClosed);
        }

        self.logic.before_render(&mut self.backend, &mut self.scene)?;
        self.logic.update(&mut self.backend, &mut self.scene)?;
        self.logic.after_render(&mut self.backend, &mut self.scene)?;

        self.cycles += 1;
        Ok(())
    }

    /// Run `cleanup`, empty the scene and dispose the backend.
    ///
    /// Only the first call has an effect.
    pub fn clear(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;

        self.logic.cleanup();
        self.scene.clear();
        self.backend.clear_scene();
        self.backend.dispose();
        log::info!("Render engine cleared after {} cycles", self.cycles);
    }

    /// Whether [`Engine::clear`] has run
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Number of completed cycles
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// The backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The scene
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The logic
    pub fn logic(&self) -> &L {
        &self.logic
    }

    /// The logic, mutably
    pub fn logic_mut(&mut self) -> &mut L {
        &mut self.logic
    }
}

impl<B: RenderBackend, L: EngineLogic<B>> Drop for Engine<B, L> {
    fn drop(&mut self) {
        self.clear();
    }
}
