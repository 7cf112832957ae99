//! # Viewpoint Selection
//!
//! Decides from where a model is photographed.
//!
//! - [`ViewVector`]: unit camera direction plus zoom
//! - [`EntropyCalculator`]: information content of a rendered frame
//! - [`ViewpointOptimizer`]: hill-climbing search for the highest-entropy view
//! - [`ViewpointSelector`]: named strategy to list of views

pub mod entropy;
pub mod optimizer;
pub mod strategy;
pub mod view_vector;

pub use entropy::{CalculationMethod, EntropyCalculator, HemisphereWeights, Histogram};
pub use optimizer::{OptimizationOutcome, OptimizerOptions, ProposalStrategy, ViewpointOptimizer};
pub use strategy::{ViewpointSelector, ViewpointStrategy};
pub use view_vector::{dodecahedron_views, golden_spiral_views, ViewVector};
