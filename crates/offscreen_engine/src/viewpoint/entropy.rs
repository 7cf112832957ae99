//! # Entropy Calculator
//!
//! Scores a rendered frame by the Shannon entropy (base 2) of the luminance
//! histogram of its foreground pixels. A pixel is background when it is fully
//! transparent or exactly equals the clear colour.

use image::{Pixel, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::core::config::PipelineConfig;
use crate::render::{RenderError, RenderResult};

use super::view_vector::ViewVector;

/// How histogram counts are turned into probabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CalculationMethod {
    /// `p_i = c_i / N` over the `N` foreground pixels
    #[default]
    RelativeToTotalArea,
    /// Entropy of `p_i = c_i / N` scaled by the hemisphere weight of the view
    RelativeToTotalAreaWeighted,
}

/// Hemisphere bias of the weighted method
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HemisphereWeights {
    /// Weight for views with positive Y (looking down on the model)
    pub y_pos: f32,
    /// Weight for views with zero or negative Y
    pub y_neg: f32,
}

impl Default for HemisphereWeights {
    fn default() -> Self {
        Self {
            y_pos: 1.0,
            y_neg: 1.0,
        }
    }
}

impl HemisphereWeights {
    /// Create hemisphere weights
    pub fn new(y_pos: f32, y_neg: f32) -> Self {
        Self { y_pos, y_neg }
    }

    /// Weight applying to `view`
    pub fn for_view(&self, view: &ViewVector) -> f32 {
        if view.direction().y > 0.0 {
            self.y_pos
        } else {
            self.y_neg
        }
    }

    /// Both weights must lie in (0, 1]
    pub fn validate(&self) -> RenderResult<()> {
        for (name, w) in [("y_pos", self.y_pos), ("y_neg", self.y_neg)] {
            if !(w > 0.0 && w <= 1.0) {
                return Err(RenderError::InvalidInput(format!(
                    "hemisphere weight {} must lie in (0, 1], got {}",
                    name, w
                )));
            }
        }
        Ok(())
    }
}

/// Luminance histogram of a frame's foreground
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    /// Pixel count per bucket
    pub counts: Vec<u64>,
    /// Number of foreground pixels
    pub total: u64,
}

/// Computes visual entropy of rendered frames
#[derive(Debug, Clone)]
pub struct EntropyCalculator {
    bins: usize,
    background: Rgba<u8>,
}

impl EntropyCalculator {
    /// Create a calculator with `bins` luminance buckets
    ///
    /// # Errors
    /// `InvalidInput` unless `1 <= bins <= 256`.
    pub fn new(bins: usize, background: [u8; 4]) -> RenderResult<Self> {
        if bins == 0 || bins > 256 {
            return Err(RenderError::InvalidInput(format!(
                "histogram bins must be within 1..=256, got {}",
                bins
            )));
        }
        Ok(Self {
            bins,
            background: Rgba(background),
        })
    }

    /// Create a calculator matching a pipeline configuration
    pub fn from_config(config: &PipelineConfig) -> RenderResult<Self> {
        Self::new(config.entropy.bins, config.window.background)
    }

    fn is_background(&self, pixel: &Rgba<u8>) -> bool {
        pixel.0[3] == 0 || *pixel == self.background
    }

    /// Build the foreground luminance histogram of `image`
    ///
    /// # Errors
    /// `InvalidInput` for a zero-sized image.
    pub fn histogram(&self, image: &RgbaImage) -> RenderResult<Histogram> {
        if image.width() == 0 || image.height() == 0 {
            return Err(RenderError::InvalidInput(format!(
                "cannot score a {}x{} image",
                image.width(),
                image.height()
            )));
        }

        let mut counts = vec![0_u64; self.bins];
        let mut total = 0;
        for pixel in image.pixels().filter(|p| !self.is_background(p)) {
            let luma = usize::from(pixel.to_luma().0[0]);
            counts[luma * self.bins / 256] += 1;
            total += 1;
        }
        Ok(Histogram { counts, total })
    }

    /// Entropy of `image`, rendered from `view`.
    ///
    /// Returns 0 for an image without foreground pixels. The result is always
    /// finite and non-negative.
    ///
    /// # Errors
    /// `InvalidInput` for a zero-sized image or weights outside (0, 1].
    pub fn score(
        &self,
        image: &RgbaImage,
        method: CalculationMethod,
        weights: HemisphereWeights,
        view: &ViewVector,
    ) -> RenderResult<f32> {
        let histogram = self.histogram(image)?;
        if histogram.total == 0 {
            return Ok(0.0);
        }

        let weight = match method {
            CalculationMethod::RelativeToTotalArea => 1.0,
            CalculationMethod::RelativeToTotalAreaWeighted => {
                weights.validate()?;
                f64::from(weights.for_view(view))
            }
        };

        let total = histogram.total as f64;
        let entropy: f64 = histogram
            .counts
            .iter()
            .filter(|&&c| c > 0)
            .map(|&c| {
                let p = c as f64 / total;
                -weight * p * p.log2()
            })
            .sum();

        Ok(entropy.max(0.0) as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use approx::assert_relative_eq;

    fn calculator() -> EntropyCalculator {
        EntropyCalculator::new(256, [0, 0, 0, 0]).unwrap()
    }

    fn gray(v: u8) -> Rgba<u8> {
        Rgba([v, v, v, 255])
    }

    fn unweighted(calculator: &EntropyCalculator, image: &RgbaImage) -> f32 {
        calculator
            .score(
                image,
                CalculationMethod::RelativeToTotalArea,
                HemisphereWeights::default(),
                &ViewVector::front(1.0),
            )
            .unwrap()
    }

    fn below() -> ViewVector {
        ViewVector::new(Vec3::new(0.0, -1.0, 1.0), 1.0).unwrap()
    }

    #[test]
    fn test_uniform_image_has_zero_entropy() {
        let image = RgbaImage::from_pixel(16, 16, gray(128));
        assert_relative_eq!(unweighted(&calculator(), &image), 0.0);
    }

    #[test]
    fn test_all_levels_reach_maximum_entropy() {
        let image = RgbaImage::from_fn(16, 16, |x, y| gray((y * 16 + x) as u8));
        assert_relative_eq!(unweighted(&calculator(), &image), 8.0, epsilon = 1e-4);

        let coarse = EntropyCalculator::new(16, [0, 0, 0, 0]).unwrap();
        assert_relative_eq!(unweighted(&coarse, &image), 4.0, epsilon = 1e-4);
    }

    #[test]
    fn test_background_pixels_are_ignored() {
        let image = RgbaImage::from_fn(8, 8, |x, _| {
            if x < 4 {
                Rgba([0, 0, 0, 0])
            } else if x < 6 {
                gray(40)
            } else {
                gray(200)
            }
        });

        let histogram = calculator().histogram(&image).unwrap();
        assert_eq!(histogram.total, 32);
        assert_relative_eq!(unweighted(&calculator(), &image), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_opaque_clear_colour_counts_as_background() {
        let background = [10, 20, 30, 255];
        let calculator = EntropyCalculator::new(256, background).unwrap();
        let image = RgbaImage::from_pixel(4, 4, Rgba(background));

        assert_eq!(calculator.histogram(&image).unwrap().total, 0);
    }

    #[test]
    fn test_empty_image_scores_zero() {
        let image = RgbaImage::new(8, 8);
        assert_relative_eq!(unweighted(&calculator(), &image), 0.0);
    }

    #[test]
    fn test_zero_sized_image_is_invalid() {
        let image = RgbaImage::new(0, 4);
        let result = calculator().score(
            &image,
            CalculationMethod::RelativeToTotalArea,
            HemisphereWeights::default(),
            &ViewVector::front(1.0),
        );
        assert!(matches!(result, Err(RenderError::InvalidInput(_))));
    }

    #[test]
    fn test_weighted_method_scales_entropy_by_hemisphere() {
        let image = RgbaImage::from_fn(2, 1, |x, _| gray(if x == 0 { 50 } else { 150 }));
        let weights = HemisphereWeights::new(0.8, 0.7);
        let calc = calculator();
        let method = CalculationMethod::RelativeToTotalAreaWeighted;

        let up_score = calc.score(&image, method, weights, &ViewVector::upper_left(1.0)).unwrap();
        let down_score = calc.score(&image, method, weights, &below()).unwrap();

        assert_relative_eq!(up_score, 0.8, epsilon = 1e-5);
        assert_relative_eq!(down_score, 0.7, epsilon = 1e-5);
    }

    #[test]
    fn test_weighted_method_never_prefers_lower_weight_hemisphere() {
        let weights = HemisphereWeights::new(0.8, 0.7);
        let method = CalculationMethod::RelativeToTotalAreaWeighted;
        let calc = calculator();

        let images = [
            RgbaImage::from_pixel(8, 8, gray(128)),
            RgbaImage::from_fn(8, 8, |x, y| gray(if x == 0 && y == 0 { 10 } else { 200 })),
            RgbaImage::from_fn(8, 8, |x, _| gray(if x < 4 { 60 } else { 180 })),
            RgbaImage::from_fn(16, 16, |x, y| gray((y * 16 + x) as u8)),
        ];
        for image in &images {
            let up = calc.score(image, method, weights, &ViewVector::upper_left(1.0)).unwrap();
            let down = calc.score(image, method, weights, &below()).unwrap();
            assert!(up >= down, "up {} < down {}", up, down);
        }

        let uniform = calc.score(&images[0], method, weights, &below()).unwrap();
        assert_relative_eq!(uniform, 0.0);
    }

    #[test]
    fn test_invalid_weights_are_rejected() {
        let image = RgbaImage::from_pixel(2, 2, gray(90));
        let result = calculator().score(
            &image,
            CalculationMethod::RelativeToTotalAreaWeighted,
            HemisphereWeights::new(1.5, 0.7),
            &ViewVector::front(1.0),
        );
        assert!(matches!(result, Err(RenderError::InvalidInput(_))));
    }

    #[test]
    fn test_bins_are_validated() {
        assert!(EntropyCalculator::new(0, [0; 4]).is_err());
        assert!(EntropyCalculator::new(257, [0; 4]).is_err());
    }
}
