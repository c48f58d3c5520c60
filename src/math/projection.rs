//! Principal axis estimation for projecting color features onto a 2D layout plane
//!
//! Axes are estimated with a fast one-sided power iteration: each pass sums
//! the feature vectors lying on the non-negative side of the current estimate
//! and renormalizes. The result is biased toward the dense side of the color
//! distribution, which is acceptable for layout purposes and far cheaper than
//! a full covariance decomposition.

use log::warn;

use crate::io::configuration::{PRIMARY_AXIS_SEED, PROJECTION_ITERATIONS, SECONDARY_AXIS_SEED};
use crate::io::error::{MosaicError, Result};
use crate::math::vector::{add, dot, normalize, reject};

/// Two orthonormal directions in color-feature space
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectionAxes {
    /// Direction of dominant spread
    pub primary: [f64; 3],
    /// Next dominant direction, orthogonal to `primary`
    pub secondary: [f64; 3],
}

impl ProjectionAxes {
    /// Project a feature vector onto both axes
    pub fn project(&self, feature: &[f64; 3]) -> [f64; 2] {
        [dot(&self.primary, feature), dot(&self.secondary, feature)]
    }
}

/// Estimates [`ProjectionAxes`] from a set of feature vectors
#[derive(Clone, Copy, Debug)]
pub struct FeatureProjector {
    iterations: usize,
    primary_seed: [f64; 3],
    secondary_seed: [f64; 3],
    strict: bool,
}

impl Default for FeatureProjector {
    fn default() -> Self {
        Self::new(PROJECTION_ITERATIONS)
    }
}

impl FeatureProjector {
    /// Create a projector running `iterations` passes per axis with the default seeds
    pub const fn new(iterations: usize) -> Self {
        Self {
            iterations,
            primary_seed: PRIMARY_AXIS_SEED,
            secondary_seed: SECONDARY_AXIS_SEED,
            strict: false,
        }
    }

    /// Replace the starting directions of both axes
    #[must_use]
    pub const fn with_seeds(mut self, primary: [f64; 3], secondary: [f64; 3]) -> Self {
        self.primary_seed = primary;
        self.secondary_seed = secondary;
        self
    }

    /// Fail on degenerate input instead of falling back to the seed directions
    #[must_use]
    pub const fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Estimate both axes from `features`
    ///
    /// Deterministic: identical input always yields bit-identical axes.
    ///
    /// # Errors
    ///
    /// Returns [`MosaicError::DegenerateProjection`] in strict mode when an
    /// estimate collapses to a zero vector, and in any mode when a seed
    /// direction itself has zero length.
    pub fn fit(&self, features: &[[f64; 3]]) -> Result<ProjectionAxes> {
        let primary_seed = normalize(&self.primary_seed)
            .ok_or(MosaicError::DegenerateProjection { axis: "primary" })?;

        let primary = match refine_axis(primary_seed, None, self.iterations, features) {
            Some(axis) => axis,
            None if self.strict => {
                return Err(MosaicError::DegenerateProjection { axis: "primary" });
            }
            None => {
                warn!("primary axis estimate degenerated, using seed direction");
                primary_seed
            }
        };

        let secondary = match refine_axis(
            self.secondary_seed,
            Some(&primary),
            self.iterations,
            features,
        ) {
            Some(axis) => axis,
            None if self.strict => {
                return Err(MosaicError::DegenerateProjection { axis: "secondary" });
            }
            None => {
                warn!("secondary axis estimate degenerated, using orthogonalized seed");
                orthogonal_fallback(&self.secondary_seed, &primary)
            }
        };

        Ok(ProjectionAxes { primary, secondary })
    }
}

/// Run the one-sided power iteration for a single axis
///
/// Returns `None` when any pass sums to a zero-length vector.
fn refine_axis(
    seed: [f64; 3],
    orthogonal_to: Option<&[f64; 3]>,
    iterations: usize,
    features: &[[f64; 3]],
) -> Option<[f64; 3]> {
    let mut axis = seed;
    for _ in 0..iterations {
        let mut sum = [0.0; 3];
        for feature in features {
            let x = orthogonal_to.map_or(*feature, |fixed| reject(feature, fixed));
            if dot(&axis, &x) >= 0.0 {
                sum = add(&sum, &x);
            }
        }
        axis = normalize(&sum)?;
    }
    Some(axis)
}

/// Unit vector orthogonal to `primary`, as close to `seed` as possible
fn orthogonal_fallback(seed: &[f64; 3], primary: &[f64; 3]) -> [f64; 3] {
    if let Some(axis) = normalize(&reject(seed, primary)) {
        return axis;
    }

    // Basis vector least aligned with the primary axis is never parallel to it
    let basis = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
    let least_aligned = basis
        .iter()
        .min_by(|a, b| dot(a, primary).abs().total_cmp(&dot(b, primary).abs()))
        .copied()
        .unwrap_or([1.0, 0.0, 0.0]);

    normalize(&reject(&least_aligned, primary)).unwrap_or(least_aligned)
}
