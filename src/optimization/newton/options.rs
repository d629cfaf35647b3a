//! Validated settings of the damped Newton–Raphson solver.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::validation::positive_finite_reason,
};

/// Default convergence threshold on `max |Δ|`.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;
/// Default iteration cap.
pub const DEFAULT_MAX_ITER: usize = 50;
/// Default cap on `max |Δ|` per iteration.
pub const DEFAULT_MAX_STEP: f64 = 1.0;
/// Default number of step halvings when an objective value is available.
pub const DEFAULT_MAX_HALVINGS: usize = 8;
/// Default curvature margin enforced by the ridge shift.
pub const DEFAULT_RIDGE_FLOOR: f64 = 1e-4;

/// Settings of [`super::solve`].
///
/// - `tolerance`: converge once the accepted step has `max |Δ| < tolerance`.
/// - `max_iter`: iteration cap; exhausting it yields an unconverged outcome.
/// - `max_step`: Newton steps are scaled down so that `max |Δ| ≤ max_step`.
/// - `max_halvings`: step halvings tried while the objective decreases.
/// - `ridge_floor`: after stabilization the largest Hessian eigenvalue is at
///   most `-ridge_floor`.
/// - `verbose`: log iterations (feature `obs_slog`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewtonOptions {
    pub tolerance: f64,
    pub max_iter: usize,
    pub max_step: f64,
    pub max_halvings: usize,
    pub ridge_floor: f64,
    pub verbose: bool,
}

impl NewtonOptions {
    /// # Errors
    /// - [`OptError::InvalidStepTolerance`], [`OptError::InvalidMaxStep`],
    ///   [`OptError::InvalidRidge`] for non-finite or non-positive values.
    /// - [`OptError::InvalidMaxIter`] when `max_iter == 0`.
    pub fn new(
        tolerance: f64, max_iter: usize, max_step: f64, max_halvings: usize, ridge_floor: f64,
        verbose: bool,
    ) -> OptResult<Self> {
        if let Some(reason) = positive_finite_reason(tolerance) {
            return Err(OptError::InvalidStepTolerance { tol: tolerance, reason });
        }
        if max_iter == 0 {
            return Err(OptError::InvalidMaxIter {
                max_iter,
                reason: "Maximum iterations must be greater than zero.",
            });
        }
        if let Some(reason) = positive_finite_reason(max_step) {
            return Err(OptError::InvalidMaxStep { value: max_step, reason });
        }
        if let Some(reason) = positive_finite_reason(ridge_floor) {
            return Err(OptError::InvalidRidge { value: ridge_floor, reason });
        }
        Ok(Self { tolerance, max_iter, max_step, max_halvings, ridge_floor, verbose })
    }

    /// Defaults with a caller-supplied iteration cap and tolerance.
    pub fn with_limits(max_iter: usize, tolerance: f64) -> OptResult<Self> {
        Self::new(
            tolerance,
            max_iter,
            DEFAULT_MAX_STEP,
            DEFAULT_MAX_HALVINGS,
            DEFAULT_RIDGE_FLOOR,
            false,
        )
    }
}

impl Default for NewtonOptions {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iter: DEFAULT_MAX_ITER,
            max_step: DEFAULT_MAX_STEP,
            max_halvings: DEFAULT_MAX_HALVINGS,
            ridge_floor: DEFAULT_RIDGE_FLOOR,
            verbose: false,
        }
    }
}
