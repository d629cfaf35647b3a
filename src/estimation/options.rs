//! Validated settings for ability estimation and item calibration.
use statrs::distribution::{Continuous, Normal};

use crate::{
    estimation::errors::{EstimatorError, EstimatorResult},
    models::{ItemParams, PARAMETER_ORDER},
    optimization::{loglik_optimizer::MLEOptions, newton::NewtonOptions},
};

pub const DEFAULT_ABILITY_BOUND: f64 = 10.0;
pub const DEFAULT_DEGENERATE_EPSILON: f64 = 1e-6;

/// Gaussian prior on ability; turns maximum likelihood into MAP.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbilityPrior {
    dist: Normal,
    mean: f64,
    sd: f64,
}

impl AbilityPrior {
    /// # Errors
    /// [`EstimatorError::InvalidPrior`] when `statrs` rejects `(mean, sd)`.
    pub fn new(mean: f64, sd: f64) -> EstimatorResult<Self> {
        let dist = Normal::new(mean, sd)
            .map_err(|err| EstimatorError::InvalidPrior { mean, sd, reason: err.to_string() })?;
        Ok(Self { dist, mean, sd })
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn sd(&self) -> f64 {
        self.sd
    }

    pub fn ln_density(&self, theta: f64) -> f64 {
        self.dist.ln_pdf(theta)
    }

    /// `d/dθ ln φ(θ)`.
    pub fn score(&self, theta: f64) -> f64 {
        -(theta - self.mean) / (self.sd * self.sd)
    }

    /// `d²/dθ² ln φ(θ)`, constant.
    pub fn curvature(&self) -> f64 {
        -1.0 / (self.sd * self.sd)
    }
}

/// Settings of [`crate::estimation::estimate_person_ability`].
///
/// Defaults: bounds `±10`, start at 0, no prior, degenerate epsilon `1e-6`,
/// default Newton settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimatorOptions {
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub initial_ability: f64,
    pub prior: Option<AbilityPrior>,
    /// Fractions within this distance of 1 (0) count as fully correct (incorrect)
    /// when detecting degenerate patterns.
    pub degenerate_epsilon: f64,
    pub newton: NewtonOptions,
}

impl EstimatorOptions {
    /// # Errors
    /// - [`EstimatorError::InvalidBounds`] for non-finite or unordered bounds,
    ///   or an initial ability outside them.
    /// - [`EstimatorError::InvalidEpsilon`] unless `0 ≤ eps < 0.5`.
    pub fn new(
        lower_bound: f64, upper_bound: f64, initial_ability: f64, prior: Option<AbilityPrior>,
        degenerate_epsilon: f64, newton: NewtonOptions,
    ) -> EstimatorResult<Self> {
        if !lower_bound.is_finite() || !upper_bound.is_finite() {
            return Err(EstimatorError::InvalidBounds {
                lower: lower_bound,
                upper: upper_bound,
                reason: "Bounds must be finite.",
            });
        }
        if lower_bound >= upper_bound {
            return Err(EstimatorError::InvalidBounds {
                lower: lower_bound,
                upper: upper_bound,
                reason: "Lower bound must be below the upper bound.",
            });
        }
        if !(lower_bound..=upper_bound).contains(&initial_ability) {
            return Err(EstimatorError::InvalidBounds {
                lower: lower_bound,
                upper: upper_bound,
                reason: "Initial ability must lie within the bounds.",
            });
        }
        if !(0.0..0.5).contains(&degenerate_epsilon) {
            return Err(EstimatorError::InvalidEpsilon { value: degenerate_epsilon });
        }
        Ok(Self { lower_bound, upper_bound, initial_ability, prior, degenerate_epsilon, newton })
    }

    pub fn with_prior(mut self, prior: AbilityPrior) -> Self {
        self.prior = Some(prior);
        self
    }
}

impl Default for EstimatorOptions {
    fn default() -> Self {
        Self {
            lower_bound: -DEFAULT_ABILITY_BOUND,
            upper_bound: DEFAULT_ABILITY_BOUND,
            initial_ability: 0.0,
            prior: None,
            degenerate_epsilon: DEFAULT_DEGENERATE_EPSILON,
            newton: NewtonOptions::default(),
        }
    }
}

/// Objective maximized during item calibration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ItemObjective {
    /// `Σ n·[k ln p + (1 − k) ln(1 − p)]`.
    #[default]
    LogLikelihood,
    /// `−Σ n (k − p)²`.
    LeastMeanSquares,
}

/// Box constraints for item parameters in canonical order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemBounds {
    pub lower: [f64; 4],
    pub upper: [f64; 4],
}

impl Default for ItemBounds {
    /// difficulty `[-10, 10]`, discrimination `[0.01, 10]`, guessing
    /// `[0, 0.5]`, upper asymptote `[0.51, 1]`.
    fn default() -> Self {
        Self { lower: [-10.0, 0.01, 0.0, 0.51], upper: [10.0, 10.0, 0.5, 1.0] }
    }
}

impl ItemBounds {
    /// # Errors
    /// [`EstimatorError::InvalidBounds`] for a non-finite or empty interval,
    /// or asymptote boxes that would allow `guessing ≥ upper`.
    pub fn new(lower: [f64; 4], upper: [f64; 4]) -> EstimatorResult<Self> {
        for (lo, hi) in lower.iter().zip(upper.iter()) {
            if !lo.is_finite() || !hi.is_finite() || lo > hi {
                return Err(EstimatorError::InvalidBounds {
                    lower: *lo,
                    upper: *hi,
                    reason: "Item parameter bounds must be finite and ordered.",
                });
            }
        }
        if upper[2] >= lower[3] || lower[2] < 0.0 || upper[3] > 1.0 {
            return Err(EstimatorError::InvalidBounds {
                lower: upper[2],
                upper: lower[3],
                reason: "Guessing and upper asymptote boxes must be disjoint within [0, 1].",
            });
        }
        Ok(Self { lower, upper })
    }

    pub fn clamp(&self, ip: &ItemParams) -> ItemParams {
        let mut out = *ip;
        for index in 0..PARAMETER_ORDER.len() {
            out.set(index, ip.get(index).clamp(self.lower[index], self.upper[index]));
        }
        out
    }
}

/// Settings of [`crate::estimation::calibrate_item`].
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationOptions {
    pub objective: ItemObjective,
    pub bounds: ItemBounds,
    pub newton: NewtonOptions,
    /// L-BFGS settings for the log-likelihood fallback; `None` disables it.
    pub fallback: Option<MLEOptions>,
}

impl Default for CalibrationOptions {
    fn default() -> Self {
        Self {
            objective: ItemObjective::default(),
            bounds: ItemBounds::default(),
            newton: NewtonOptions::default(),
            fallback: Some(MLEOptions::default()),
        }
    }
}
