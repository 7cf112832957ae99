//! # Viewpoint Optimizer
//!
//! Hill-climbing search for the view vector whose rendered frame has the
//! highest entropy.
//!
//! Each run evaluates exactly `iterations` candidates. A candidate that cannot
//! be rendered or scored is rejected and the search continues; only fatal
//! backend errors abort the run.

use std::time::Instant;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::foundation::math::Vec3;
use crate::render::{RenderError, RenderResult, ViewRenderer};

use super::entropy::{CalculationMethod, EntropyCalculator, HemisphereWeights};
use super::view_vector::ViewVector;

/// Default radius of the neighbourhood proposals
pub const DEFAULT_NEIGHBORHOOD_STEP: f32 = 0.25;

/// How candidates are proposed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProposalStrategy {
    /// Every candidate is a fresh uniformly random direction
    #[default]
    Randomized,
    /// Every candidate is a small random perturbation of the current best
    NeighborhoodGradient,
}

/// Options of a single optimisation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerOptions {
    /// Number of candidates evaluated
    pub iterations: usize,
    /// Starting direction; normalized before use
    pub initial_view_vector: Vec3,
    /// Hemisphere weights of the weighted method
    pub weights: HemisphereWeights,
    /// Entropy normalisation
    pub calculation_method: CalculationMethod,
    /// Candidate proposal
    pub proposal_strategy: ProposalStrategy,
    /// Perturbation radius of `NeighborhoodGradient`
    pub neighborhood_step: f32,
}

impl Default for OptimizerOptions {
    fn default() -> Self {
        Self {
            iterations: 100,
            initial_view_vector: Vec3::new(0.0, 0.0, 1.0),
            weights: HemisphereWeights::default(),
            calculation_method: CalculationMethod::RelativeToTotalArea,
            proposal_strategy: ProposalStrategy::Randomized,
            neighborhood_step: DEFAULT_NEIGHBORHOOD_STEP,
        }
    }
}

impl OptimizerOptions {
    /// Randomized proposals scored relative to total area
    pub fn entropy_randomized() -> Self {
        Self::default()
    }

    /// Randomized proposals scored with the 0.8 / 0.7 hemisphere weights
    pub fn entropy_randomized_weighted() -> Self {
        Self {
            weights: HemisphereWeights::new(0.8, 0.7),
            calculation_method: CalculationMethod::RelativeToTotalAreaWeighted,
            ..Self::default()
        }
    }

    /// Set the number of candidates
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set the starting direction
    pub fn with_initial_view_vector(mut self, initial: Vec3) -> Self {
        self.initial_view_vector = initial;
        self
    }

    /// Set the proposal strategy
    pub fn with_proposal_strategy(mut self, strategy: ProposalStrategy) -> Self {
        self.proposal_strategy = strategy;
        self
    }
}

/// Result of an optimisation run
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationOutcome {
    /// Best view found
    pub view: ViewVector,
    /// Entropy of the best view, `-inf` when no candidate was evaluated
    pub best_score: f32,
    /// Candidates successfully rendered and scored
    pub evaluated: usize,
    /// Candidates rejected because they could not be rendered or scored
    pub rejected: usize,
    /// Best score after each iteration; non-decreasing
    pub history: Vec<f32>,
}

/// Entropy-maximising view search
#[derive(Debug, Clone)]
pub struct ViewpointOptimizer {
    calculator: EntropyCalculator,
    zoom: f32,
}

impl ViewpointOptimizer {
    /// Create an optimizer placing candidate cameras at distance `zoom`
    pub fn new(calculator: EntropyCalculator, zoom: f32) -> Self {
        Self { calculator, zoom }
    }

    /// Entropy calculator used for scoring
    pub fn calculator(&self) -> &EntropyCalculator {
        &self.calculator
    }

    /// Run the search against the scene currently loaded in `renderer`.
    ///
    /// With `iterations == 0` the normalized initial vector is returned
    /// without rendering anything.
    ///
    /// # Errors
    /// - `InvalidInput` for a degenerate initial vector
    /// - `RenderFailure` when no candidate could be rendered at all
    /// - `BackendFatal` / `PipelineClosed` as soon as the renderer reports them
    pub fn maximize_entropy<V, R>(
        &self,
        renderer: &mut V,
        options: &OptimizerOptions,
        rng: &mut R,
    ) -> RenderResult<OptimizationOutcome>
    where
        V: ViewRenderer + ?Sized,
        R: Rng + ?Sized,
    {
        let start = Instant::now();
        let mut current = ViewVector::new(options.initial_view_vector, self.zoom)?;
        let mut best_score = f32::NEG_INFINITY;
        let mut evaluated = 0;
        let mut rejected = 0;
        let mut last_error = None;
        let mut history = Vec::with_capacity(options.iterations);

        for iteration in 0..options.iterations {
            let candidate = match options.proposal_strategy {
                ProposalStrategy::Randomized => ViewVector::random(rng, self.zoom),
                ProposalStrategy::NeighborhoodGradient => {
                    current.perturbed(rng, options.neighborhood_step)
                }
            };

            match self.evaluate(renderer, options, &candidate) {
                Ok(score) => {
                    evaluated += 1;
                    if score > best_score {
                        log::trace!(
                            "Iteration {}: entropy {:.4} improves on {:.4}",
                            iteration,
                            score,
                            best_score
                        );
                        best_score = score;
                        current = candidate;
                    }
                }
                Err(error) if error.is_fatal() => return Err(error),
                Err(error) => {
                    log::trace!("Iteration {}: candidate rejected: {}", iteration, error);
                    rejected += 1;
                    last_error = Some(error);
                }
            }
            history.push(best_score);
        }

        if options.iterations > 0 && evaluated == 0 {
            let cause = last_error.map_or_else(String::new, |e| e.to_string());
            return Err(RenderError::RenderFailure(format!(
                "no candidate of {} could be rendered: {}",
                options.iterations, cause
            )));
        }

        log::debug!(
            "Entropy optimisation finished in {:?}: best {:.4} at {:?} ({} evaluated, {} rejected)",
            start.elapsed(),
            best_score,
            current.direction().into_inner(),
            evaluated,
            rejected
        );

        Ok(OptimizationOutcome {
            view: current,
            best_score,
            evaluated,
            rejected,
            history,
        })
    }

    fn evaluate<V: ViewRenderer + ?Sized>(
        &self,
        renderer: &mut V,
        options: &OptimizerOptions,
        candidate: &ViewVector,
    ) -> RenderResult<f32> {
        let image = renderer.render_view(candidate)?;
        self.calculator.score(
            &image,
            options.calculation_method,
            options.weights,
            candidate,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::WindowOptions;
    use crate::render::{RenderBackend, SoftwareBackend};
    use crate::scene::{Model, Scene};
    use approx::assert_relative_eq;
    use image::{Rgba, RgbaImage};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    /// Renders an image whose entropy grows with the view's X component and
    /// fails on scripted calls.
    struct ScriptedRenderer {
        calls: usize,
        fail_on: Vec<usize>,
        error: RenderError,
    }

    impl ScriptedRenderer {
        fn new() -> Self {
            Self {
                calls: 0,
                fail_on: Vec::new(),
                error: RenderError::RenderFailure("scripted".to_string()),
            }
        }

        fn failing(fail_on: Vec<usize>, error: RenderError) -> Self {
            Self {
                calls: 0,
                fail_on,
                error,
            }
        }
    }

    impl ViewRenderer for ScriptedRenderer {
        fn render_view(&mut self, view: &ViewVector) -> RenderResult<RgbaImage> {
            let call = self.calls;
            self.calls += 1;
            if self.fail_on.contains(&call) {
                return Err(self.error.clone());
            }

            let levels = 1 + ((view.direction().x + 1.0) * 7.5) as u32;
            Ok(RgbaImage::from_fn(16, 1, |x, _| {
                let v = (x % levels * 16) as u8;
                Rgba([v, v, v, 255])
            }))
        }
    }

    fn optimizer() -> ViewpointOptimizer {
        ViewpointOptimizer::new(EntropyCalculator::new(256, [0, 0, 0, 0]).unwrap(), 1.0)
    }

    #[test]
    fn test_zero_iterations_returns_initial_vector() {
        let mut renderer = ScriptedRenderer::new();
        let options = OptimizerOptions::default()
            .with_iterations(0)
            .with_initial_view_vector(Vec3::new(0.0, 3.0, 4.0));

        let outcome = optimizer()
            .maximize_entropy(&mut renderer, &options, &mut StdRng::seed_from_u64(1))
            .unwrap();

        assert_eq!(renderer.calls, 0);
        assert_eq!(outcome.evaluated, 0);
        assert_relative_eq!(
            outcome.view.direction().into_inner(),
            Vec3::new(0.0, 0.6, 0.8),
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_best_score_never_decreases() {
        for strategy in [ProposalStrategy::Randomized, ProposalStrategy::NeighborhoodGradient] {
            let mut renderer = ScriptedRenderer::new();
            let options = OptimizerOptions::default()
                .with_iterations(40)
                .with_proposal_strategy(strategy);

            let outcome = optimizer()
                .maximize_entropy(&mut renderer, &options, &mut StdRng::seed_from_u64(9))
                .unwrap();

            assert_eq!(renderer.calls, 40);
            assert_eq!(outcome.history.len(), 40);
            assert!(outcome.history.windows(2).all(|w| w[1] >= w[0]));
            assert_relative_eq!(outcome.best_score, *outcome.history.last().unwrap());
            assert_relative_eq!(outcome.view.direction().norm(), 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_failed_candidates_are_rejected() {
        let mut renderer =
            ScriptedRenderer::failing(vec![0, 2, 4], RenderError::RenderFailure("miss".into()));
        let options = OptimizerOptions::default().with_iterations(10);

        let outcome = optimizer()
            .maximize_entropy(&mut renderer, &options, &mut StdRng::seed_from_u64(5))
            .unwrap();

        assert_eq!(outcome.evaluated, 7);
        assert_eq!(outcome.rejected, 3);
        assert!(outcome.best_score.is_finite());
    }

    #[test]
    fn test_run_without_any_frame_fails() {
        let failure = RenderError::RenderFailure("no geometry".into());
        let mut renderer = ScriptedRenderer::failing((0..5).collect(), failure);
        let options = OptimizerOptions::default().with_iterations(5);

        let result =
            optimizer().maximize_entropy(&mut renderer, &options, &mut StdRng::seed_from_u64(5));
        assert!(matches!(result, Err(RenderError::RenderFailure(_))));
    }

    #[test]
    fn test_fatal_error_aborts_run() {
        let mut renderer =
            ScriptedRenderer::failing(vec![3], RenderError::BackendFatal("context lost".into()));
        let options = OptimizerOptions::default().with_iterations(10);

        let result =
            optimizer().maximize_entropy(&mut renderer, &options, &mut StdRng::seed_from_u64(5));
        assert!(matches!(result, Err(RenderError::BackendFatal(_))));
        assert_eq!(renderer.calls, 4);
    }

    #[test]
    fn test_degenerate_initial_vector_is_invalid() {
        let options = OptimizerOptions::default().with_initial_view_vector(Vec3::zeros());
        let result = optimizer().maximize_entropy(
            &mut ScriptedRenderer::new(),
            &options,
            &mut StdRng::seed_from_u64(5),
        );
        assert!(matches!(result, Err(RenderError::InvalidInput(_))));
    }

    #[test]
    fn test_cube_optimum_beats_front_view() {
        let mut backend = SoftwareBackend::new(&WindowOptions::new(48, 48)).unwrap();
        let mut scene = Scene::new();
        backend
            .load_model(scene.install(Arc::new(Model::placeholder_cube("cube"))))
            .unwrap();

        let optimizer = optimizer();
        let front = backend.render_view(&ViewVector::front(1.0)).unwrap();
        let front_score = optimizer
            .calculator()
            .score(
                &front,
                CalculationMethod::RelativeToTotalArea,
                HemisphereWeights::default(),
                &ViewVector::front(1.0),
            )
            .unwrap();

        let outcome = optimizer
            .maximize_entropy(
                &mut backend,
                &OptimizerOptions::entropy_randomized().with_iterations(20),
                &mut StdRng::seed_from_u64(11),
            )
            .unwrap();

        assert_relative_eq!(front_score, 0.0);
        assert!(outcome.best_score > front_score);
    }
}
