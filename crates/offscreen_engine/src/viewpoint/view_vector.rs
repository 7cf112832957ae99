//! # View Vectors
//!
//! A [`ViewVector`] is a unit direction from which the camera observes the
//! origin-centred model, together with the camera distance (zoom). The
//! direction is unit length by construction.

use std::f32::consts::PI;

use rand::Rng;

use crate::foundation::math::{try_normalize, Unit, Vec3};
use crate::render::{RenderError, RenderResult};

/// Golden ratio
const PHI: f32 = 1.618_034;

/// Unit camera direction plus camera distance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewVector {
    direction: Unit<Vec3>,
    zoom: f32,
}

impl ViewVector {
    /// Create a view vector, normalizing `direction`.
    ///
    /// # Errors
    /// `InvalidInput` for a zero or non-finite direction or a zoom that is not
    /// a positive finite number.
    pub fn new(direction: Vec3, zoom: f32) -> RenderResult<Self> {
        let direction = try_normalize(direction).ok_or_else(|| {
            RenderError::InvalidInput(format!("degenerate view direction {:?}", direction))
        })?;
        Self::from_unit(direction, zoom)
    }

    /// Create a view vector from an already normalized direction
    ///
    /// # Errors
    /// `InvalidInput` when the zoom is not a positive finite number.
    pub fn from_unit(direction: Unit<Vec3>, zoom: f32) -> RenderResult<Self> {
        if !zoom.is_finite() || zoom <= 0.0 {
            return Err(RenderError::InvalidInput(format!(
                "zoom must be positive, got {}",
                zoom
            )));
        }
        Ok(Self { direction, zoom })
    }

    // Constant directions with a zoom that was validated by the caller's
    // configuration. Non-positive zooms fall back to 1.
    fn fixed(direction: Vec3, zoom: f32) -> Self {
        let zoom = if zoom.is_finite() && zoom > 0.0 { zoom } else { 1.0 };
        Self {
            direction: Unit::new_normalize(direction),
            zoom,
        }
    }

    /// Camera in front of the model, on +Z
    pub fn front(zoom: f32) -> Self {
        Self::fixed(Vec3::new(0.0, 0.0, 1.0), zoom)
    }

    /// Camera above the model to the left, along (-1, 1, 1)
    pub fn upper_left(zoom: f32) -> Self {
        Self::fixed(Vec3::new(-1.0, 1.0, 1.0), zoom)
    }

    /// Direction sampled uniformly on the unit sphere
    pub fn random<R: Rng + ?Sized>(rng: &mut R, zoom: f32) -> Self {
        let z: f32 = rng.gen_range(-1.0..=1.0);
        let phi: f32 = rng.gen_range(0.0..(2.0 * PI));
        let r = (1.0 - z * z).max(0.0).sqrt();
        Self::fixed(Vec3::new(r * phi.cos(), r * phi.sin(), z), zoom)
    }

    /// Random neighbour of this direction.
    ///
    /// Adds an offset drawn from a ball of radius `step` and renormalizes.
    /// Returns `self` unchanged if the result degenerates.
    pub fn perturbed<R: Rng + ?Sized>(&self, rng: &mut R, step: f32) -> Self {
        let offset = Self::random(rng, 1.0).direction.into_inner() * step * rng.gen::<f32>().cbrt();
        try_normalize(self.direction.into_inner() + offset)
            .map_or(*self, |direction| Self {
                direction,
                zoom: self.zoom,
            })
    }

    /// Unit camera direction
    pub fn direction(&self) -> Unit<Vec3> {
        self.direction
    }

    /// Camera distance from the origin
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Camera position, `direction * zoom`
    pub fn camera_position(&self) -> Vec3 {
        self.direction.into_inner() * self.zoom
    }
}

/// The 12 face directions of a regular dodecahedron.
///
/// These are the cyclic permutations of `(0, ±1, ±φ)`, normalized, so the
/// set is symmetric and covers the sphere evenly.
pub fn dodecahedron_views(zoom: f32) -> Vec<ViewVector> {
    let mut views = Vec::with_capacity(12);
    for &a in &[1.0_f32, -1.0] {
        for &b in &[PHI, -PHI] {
            views.push(ViewVector::fixed(Vec3::new(0.0, a, b), zoom));
            views.push(ViewVector::fixed(Vec3::new(a, b, 0.0), zoom));
            views.push(ViewVector::fixed(Vec3::new(b, 0.0, a), zoom));
        }
    }
    views
}

/// `count` directions spread over the sphere along a golden-angle spiral.
///
/// The first direction points straight up and the last straight down.
pub fn golden_spiral_views(count: usize, zoom: f32) -> Vec<ViewVector> {
    let golden_angle = PI * (3.0 - 5.0_f32.sqrt());
    let steps = count.saturating_sub(1).max(1) as f32;

    (0..count)
        .map(|i| {
            let y = 1.0 - (i as f32 / steps) * 2.0;
            let radius = (1.0 - y * y).max(0.0).sqrt();
            let theta = golden_angle * i as f32;
            ViewVector::fixed(
                Vec3::new(theta.cos() * radius, y, theta.sin() * radius),
                zoom,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_new_normalizes_direction() {
        let view = ViewVector::new(Vec3::new(3.0, 0.0, 4.0), 2.0).unwrap();
        assert_relative_eq!(view.direction().norm(), 1.0, epsilon = 1e-6);
        assert_relative_eq!(view.camera_position().norm(), 2.0, epsilon = 1e-6);
    }

    #[test]
    fn test_new_rejects_degenerate_input() {
        assert!(ViewVector::new(Vec3::zeros(), 1.0).is_err());
        assert!(ViewVector::new(Vec3::x(), 0.0).is_err());
        assert!(ViewVector::new(Vec3::x(), f32::NAN).is_err());
    }

    #[test]
    fn test_random_views_are_unit_length() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let view = ViewVector::random(&mut rng, 1.0);
            assert_relative_eq!(view.direction().norm(), 1.0, epsilon = 1e-6);

            let neighbour = view.perturbed(&mut rng, 0.25);
            assert_relative_eq!(neighbour.direction().norm(), 1.0, epsilon = 1e-6);
            assert!(neighbour.direction().dot(&view.direction().into_inner()) > 0.9);
        }
    }

    #[test]
    fn test_dodecahedron_views() {
        let views = dodecahedron_views(1.5);
        assert_eq!(views.len(), 12);

        for view in &views {
            assert_relative_eq!(view.direction().norm(), 1.0, epsilon = 1e-6);
            assert_relative_eq!(view.zoom(), 1.5);
            // Every face has exactly one opposite face.
            let opposites = views
                .iter()
                .filter(|other| other.direction().dot(&view.direction().into_inner()) < -0.999)
                .count();
            assert_eq!(opposites, 1);
        }

        // Adjacent face normals of a dodecahedron are 1/sqrt(5) apart in cosine.
        let neighbours = views
            .iter()
            .filter(|other| {
                let cos = other.direction().dot(&views[0].direction().into_inner());
                (cos - 1.0 / 5.0_f32.sqrt()).abs() < 1e-4
            })
            .count();
        assert_eq!(neighbours, 5);
    }

    #[test]
    fn test_golden_spiral_views() {
        let views = golden_spiral_views(8, 1.0);
        assert_eq!(views.len(), 8);
        assert_relative_eq!(views[0].direction().y, 1.0, epsilon = 1e-6);
        assert_relative_eq!(views[7].direction().y, -1.0, epsilon = 1e-6);

        assert_eq!(golden_spiral_views(1, 1.0).len(), 1);
        assert!(golden_spiral_views(0, 1.0).is_empty());
    }
}
