//! # Offscreen Render Pipeline
//!
//! Producer/consumer adapter between callers on any thread and the
//! single-threaded render engine.
//!
//! ```text
//! caller ── submit ──▶ [requests] ──▶ run_cycle: install, select views, render
//! caller ◀─ retrieve ── [frames]  ◀──────────── one frame per view
//! ```
//!
//! Both queues are unbounded FIFO channels. A cycle loads at most one model,
//! so frame groups come out in submission order.

mod handle;
mod logic;
mod renderer;
mod request;
mod state;


pub use handle::PipelineHandle;
pub use renderer::{CycleReport, OffscreenRenderer};
pub use request::{RenderRequest, ViewSelection};
pub use state::PipelineState;
