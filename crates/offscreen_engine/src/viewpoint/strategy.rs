//! # Viewpoint Strategy Selector
//!
//! Maps a [`ViewpointStrategy`] to the view vectors a model is rendered from.
//! Fixed strategies need no rendering. Entropy strategies run the optimizer
//! against the scene currently loaded in the renderer and fall back to the
//! front view when the optimizer cannot produce a result.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::core::config::PipelineConfig;
use crate::render::{RenderResult, ViewRenderer};

use super::entropy::EntropyCalculator;
use super::optimizer::{OptimizerOptions, ViewpointOptimizer};
use super::view_vector::{dodecahedron_views, ViewVector};

/// Named view selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ViewpointStrategy {
    /// One uniformly random direction
    Random,
    /// One fixed view from above left, along (-1, 1, 1)
    FixedUpperLeft,
    /// One fixed view from the front, along +Z
    #[default]
    #[serde(alias = "FixedFront")]
    Front,
    /// One entropy-maximising view
    EntropyMaxRandomized,
    /// One entropy-maximising view with the hemisphere bias
    EntropyMaxRandomizedWeighted,
    /// The 12 dodecahedron face directions
    MultiViewFixedSet,
    /// Front, upper left, and the two entropy-maximising views
    MultiViewMixed,
}

impl ViewpointStrategy {
    /// Every strategy
    pub const ALL: [Self; 7] = [
        Self::Random,
        Self::FixedUpperLeft,
        Self::Front,
        Self::EntropyMaxRandomized,
        Self::EntropyMaxRandomizedWeighted,
        Self::MultiViewFixedSet,
        Self::MultiViewMixed,
    ];

    /// Number of views the strategy produces
    pub fn view_count(self) -> usize {
        match self {
            Self::Random
            | Self::FixedUpperLeft
            | Self::Front
            | Self::EntropyMaxRandomized
            | Self::EntropyMaxRandomizedWeighted => 1,
            Self::MultiViewFixedSet => 12,
            Self::MultiViewMixed => 4,
        }
    }

    /// Whether the strategy renders candidates to choose its views
    pub fn needs_rendering(self) -> bool {
        matches!(
            self,
            Self::EntropyMaxRandomized | Self::EntropyMaxRandomizedWeighted | Self::MultiViewMixed
        )
    }
}

/// Produces view vectors for a strategy
#[derive(Debug)]
pub struct ViewpointSelector {
    optimizer: ViewpointOptimizer,
    zoom: f32,
    entropy_iterations: usize,
    rng: StdRng,
}

impl ViewpointSelector {
    /// Create a selector. A `seed` makes random and entropy views reproducible.
    pub fn new(
        optimizer: ViewpointOptimizer,
        zoom: f32,
        entropy_iterations: usize,
        seed: Option<u64>,
    ) -> Self {
        let rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        Self {
            optimizer,
            zoom,
            entropy_iterations,
            rng,
        }
    }

    /// Create a selector from the viewpoint and entropy sections of `config`
    pub fn from_config(config: &PipelineConfig) -> RenderResult<Self> {
        let calculator = EntropyCalculator::from_config(config)?;
        let viewpoint = &config.viewpoint;
        Ok(Self::new(
            ViewpointOptimizer::new(calculator, viewpoint.zoom),
            viewpoint.zoom,
            viewpoint.entropy_iterations,
            viewpoint.seed,
        ))
    }

    /// Views for `strategy`, exactly `strategy.view_count()` of them.
    ///
    /// # Errors
    /// Only fatal renderer errors are returned; recoverable optimizer failures
    /// fall back to the front view.
    pub fn select_views<V: ViewRenderer + ?Sized>(
        &mut self,
        strategy: ViewpointStrategy,
        renderer: &mut V,
    ) -> RenderResult<Vec<ViewVector>> {
        let views = match strategy {
            ViewpointStrategy::Random => vec![ViewVector::random(&mut self.rng, self.zoom)],
            ViewpointStrategy::FixedUpperLeft => vec![ViewVector::upper_left(self.zoom)],
            ViewpointStrategy::Front => vec![ViewVector::front(self.zoom)],
            ViewpointStrategy::EntropyMaxRandomized => {
                vec![self.entropy_view(renderer, OptimizerOptions::entropy_randomized())?]
            }
            ViewpointStrategy::EntropyMaxRandomizedWeighted => {
                vec![self.entropy_view(renderer, OptimizerOptions::entropy_randomized_weighted())?]
            }
            ViewpointStrategy::MultiViewFixedSet => dodecahedron_views(self.zoom),
            ViewpointStrategy::MultiViewMixed => vec![
                ViewVector::front(self.zoom),
                ViewVector::upper_left(self.zoom),
                self.entropy_view(renderer, OptimizerOptions::entropy_randomized())?,
                self.entropy_view(renderer, OptimizerOptions::entropy_randomized_weighted())?,
            ],
        };

        log::debug!("Strategy {:?} selected {} views", strategy, views.len());
        Ok(views)
    }

    fn entropy_view<V: ViewRenderer + ?Sized>(
        &mut self,
        renderer: &mut V,
        options: OptimizerOptions,
    ) -> RenderResult<ViewVector> {
        let options = options.with_iterations(self.entropy_iterations);
        match self
            .optimizer
            .maximize_entropy(renderer, &options, &mut self.rng)
        {
            Ok(outcome) => Ok(outcome.view),
            Err(error) if error.is_fatal() => Err(error),
            Err(error) => {
                log::warn!("Entropy optimisation failed, using front view: {}", error);
                Ok(ViewVector::front(self.zoom))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RenderError;
    use approx::assert_relative_eq;
    use image::{Rgba, RgbaImage};

    struct CountingRenderer {
        calls: usize,
        result: Result<u8, RenderError>,
    }

    impl CountingRenderer {
        fn rendering() -> Self {
            Self { calls: 0, result: Ok(128) }
        }

        fn failing(error: RenderError) -> Self {
            Self {
                calls: 0,
                result: Err(error),
            }
        }
    }

    impl ViewRenderer for CountingRenderer {
        fn render_view(&mut self, view: &ViewVector) -> RenderResult<RgbaImage> {
            self.calls += 1;
            let base = self.result.clone()?;
            let shade = if view.direction().x > 0.0 { base } else { base / 2 };
            Ok(RgbaImage::from_fn(4, 4, |x, _| {
                let v = if x < 2 { shade } else { 255 };
                Rgba([v, v, v, 255])
            }))
        }
    }

    fn selector(iterations: usize) -> ViewpointSelector {
        let config = PipelineConfig::default()
            .with_seed(17)
            .with_entropy_iterations(iterations);
        ViewpointSelector::from_config(&config).unwrap()
    }

    #[test]
    fn test_every_strategy_yields_its_view_count() {
        let mut selector = selector(8);
        for strategy in ViewpointStrategy::ALL {
            let mut renderer = CountingRenderer::rendering();
            let views = selector.select_views(strategy, &mut renderer).unwrap();

            assert_eq!(views.len(), strategy.view_count(), "{:?}", strategy);
            for view in &views {
                assert_relative_eq!(view.direction().norm(), 1.0, epsilon = 1e-6);
            }
            if !strategy.needs_rendering() {
                assert_eq!(renderer.calls, 0, "{:?}", strategy);
            }
        }
    }

    #[test]
    fn test_fixed_views() {
        let mut selector = selector(8);
        let mut renderer = CountingRenderer::rendering();

        let front = selector.select_views(ViewpointStrategy::Front, &mut renderer).unwrap();
        assert_eq!(front, vec![ViewVector::front(1.0)]);

        let mixed = selector
            .select_views(ViewpointStrategy::MultiViewMixed, &mut renderer)
            .unwrap();
        assert_eq!(mixed[0], ViewVector::front(1.0));
        assert_eq!(mixed[1], ViewVector::upper_left(1.0));
        assert_eq!(renderer.calls, 16);
    }

    #[test]
    fn test_optimizer_failure_falls_back_to_front() {
        let mut selector = selector(5);
        let mut renderer =
            CountingRenderer::failing(RenderError::RenderFailure("no geometry".into()));

        let views = selector
            .select_views(ViewpointStrategy::EntropyMaxRandomizedWeighted, &mut renderer)
            .unwrap();
        assert_eq!(views, vec![ViewVector::front(1.0)]);
    }

    #[test]
    fn test_fatal_renderer_error_propagates() {
        let mut selector = selector(5);
        let mut renderer = CountingRenderer::failing(RenderError::BackendFatal("lost".into()));

        let result = selector.select_views(ViewpointStrategy::MultiViewMixed, &mut renderer);
        assert!(matches!(result, Err(RenderError::BackendFatal(_))));
    }

    #[test]
    fn test_seeded_selectors_agree() {
        let mut a = selector(6);
        let mut b = selector(6);
        let mut renderer = CountingRenderer::rendering();

        for strategy in [ViewpointStrategy::Random, ViewpointStrategy::EntropyMaxRandomized] {
            let va = a.select_views(strategy, &mut renderer).unwrap();
            let vb = b.select_views(strategy, &mut renderer).unwrap();
            assert_eq!(va, vb);
        }
    }

    #[test]
    fn test_strategy_names_parse() {
        #[derive(Deserialize)]
        struct Wrapper {
            strategy: ViewpointStrategy,
        }

        let parsed: Wrapper = toml::from_str("strategy = \"FixedFront\"").unwrap();
        assert_eq!(parsed.strategy, ViewpointStrategy::Front);
        let parsed: Wrapper = toml::from_str("strategy = \"MultiViewMixed\"").unwrap();
        assert_eq!(parsed.strategy, ViewpointStrategy::MultiViewMixed);
    }
}
