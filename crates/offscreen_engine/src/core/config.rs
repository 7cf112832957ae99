//! # Pipeline Configuration
//!
//! All settings the offscreen pipeline needs are passed once at construction.
//! Every section has sensible defaults so a configuration file only needs to
//! name what it changes:
//!
//! ```toml
//! [window]
//! width = 512
//! height = 512
//!
//! [viewpoint]
//! strategy = "MultiViewFixedSet"
//! seed = 42
//! ```

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::viewpoint::ViewpointStrategy;

/// Engine behaviour that is not specific to rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Log filter handed to `env_logger` (e.g. `"info"`, `"offscreen_engine=trace"`)
    pub log_level: String,
    /// Sleep between idle render cycles of a spawned render loop, in milliseconds
    pub idle_poll_ms: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            idle_poll_ms: 5,
        }
    }
}

impl EngineSettings {
    /// Validate the settings
    pub fn validate(&self) -> Result<(), String> {
        if self.idle_poll_ms == 0 {
            return Err("Idle poll interval must be at least 1 ms".to_string());
        }
        Ok(())
    }
}

/// # Offscreen Window Options
///
/// Size and clear colour of the offscreen render target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowOptions {
    /// Render target width in pixels
    pub width: u32,
    /// Render target height in pixels
    pub height: u32,
    /// Clear colour (RGBA). Pixels of this colour count as background.
    pub background: [u8; 4],
    /// Half of the vertical extent of the orthographic view volume
    pub ortho_half_extent: f32,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            width: 256,
            height: 256,
            background: [0, 0, 0, 0],
            ortho_half_extent: 0.6,
        }
    }
}

impl WindowOptions {
    /// Create window options with the given size and default colours
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Aspect ratio (width / height)
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Validate the options
    pub fn validate(&self) -> Result<(), String> {
        if self.width == 0 || self.height == 0 {
            return Err(format!(
                "Render target must not be empty, got {}x{}",
                self.width, self.height
            ));
        }
        if !self.ortho_half_extent.is_finite() || self.ortho_half_extent <= 0.0 {
            return Err(format!(
                "Orthographic extent must be positive, got {}",
                self.ortho_half_extent
            ));
        }
        Ok(())
    }
}

/// Viewpoint selection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewpointConfig {
    /// Strategy applied to submissions that do not override it
    pub strategy: ViewpointStrategy,
    /// Camera distance from the origin
    pub zoom: f32,
    /// Seed for the viewpoint random source; random when absent
    pub seed: Option<u64>,
    /// Candidate count of every entropy optimisation run
    pub entropy_iterations: usize,
}

impl Default for ViewpointConfig {
    fn default() -> Self {
        Self {
            strategy: ViewpointStrategy::Front,
            zoom: 1.0,
            seed: None,
            entropy_iterations: 100,
        }
    }
}

impl ViewpointConfig {
    /// Validate the settings
    pub fn validate(&self) -> Result<(), String> {
        if !self.zoom.is_finite() || self.zoom <= 0.0 {
            return Err(format!("Zoom must be positive, got {}", self.zoom));
        }
        Ok(())
    }
}

/// Entropy calculation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntropySettings {
    /// Number of luminance buckets of the histogram
    pub bins: usize,
}

impl Default for EntropySettings {
    fn default() -> Self {
        Self { bins: 256 }
    }
}

impl EntropySettings {
    /// Validate the settings
    pub fn validate(&self) -> Result<(), String> {
        if self.bins == 0 || self.bins > 256 {
            return Err(format!("Histogram bins must be within 1..=256, got {}", self.bins));
        }
        Ok(())
    }
}

/// # Complete Pipeline Configuration
///
/// Top-level configuration that encompasses all pipeline subsystems.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Engine core configuration
    pub engine: EngineSettings,
    /// Offscreen render target configuration
    pub window: WindowOptions,
    /// Viewpoint selection configuration
    pub viewpoint: ViewpointConfig,
    /// Entropy calculation configuration
    pub entropy: EntropySettings,
}

impl PipelineConfig {
    /// Create a configuration with the given strategy and defaults elsewhere
    pub fn with_strategy(strategy: ViewpointStrategy) -> Self {
        let mut config = Self::default();
        config.viewpoint.strategy = strategy;
        config
    }

    /// Set the render target size
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.window.width = width;
        self.window.height = height;
        self
    }

    /// Fix the viewpoint random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.viewpoint.seed = Some(seed);
        self
    }

    /// Set the candidate count of entropy optimisation runs
    pub fn with_entropy_iterations(mut self, iterations: usize) -> Self {
        self.viewpoint.entropy_iterations = iterations;
        self
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), String> {
        self.engine.validate()?;
        self.window.validate()?;
        self.viewpoint.validate()?;
        self.entropy.validate()?;
        Ok(())
    }
}

impl Config for PipelineConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = PipelineConfig::from_toml_str(
            r#"
            [window]
            width = 64

            [viewpoint]
            strategy = "MultiViewFixedSet"
            seed = 7
            "#,
        )
        .unwrap();

        assert_eq!(config.window.width, 64);
        assert_eq!(config.window.height, 256);
        assert_eq!(config.viewpoint.strategy, ViewpointStrategy::MultiViewFixedSet);
        assert_eq!(config.viewpoint.seed, Some(7));
        assert_eq!(config.entropy.bins, 256);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let empty = PipelineConfig::default().with_size(0, 10);
        assert!(empty.validate().is_err());

        let mut zoom = PipelineConfig::default();
        zoom.viewpoint.zoom = -1.0;
        assert!(zoom.validate().is_err());

        let mut bins = PipelineConfig::default();
        bins.entropy.bins = 300;
        assert!(bins.validate().is_err());
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let result = PipelineConfig::load_from_file("pipeline.yaml");
        assert!(result.is_err());
    }
}
