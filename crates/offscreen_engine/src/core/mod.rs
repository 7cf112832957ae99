//! Core engine types

pub mod config;

pub use config::{EngineSettings, EntropySettings, PipelineConfig, ViewpointConfig, WindowOptions};
