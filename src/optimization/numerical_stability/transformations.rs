//! Numerical stability utilities.
//!
//! Provides guarded implementations of the logistic response function and
//! the probability clamps used throughout the IRT likelihoods. Naïve
//! evaluation of `1 / (1 + exp(-x))` overflows for large negative `x`, and
//! `ln(p)` / `1 / (p (1 - p))` blow up at the asymptotes, so every model
//! routes its probabilities through the helpers defined here.
//!
//! # Provided items
//! - [`PROB_EPS`]: floor/ceiling distance used to keep probabilities inside
//!   the open interval `(0, 1)`.
//! - [`EIGEN_EPS`]: threshold below which eigenvalues are treated as zero.
//! - [`GENERAL_TOL`]: generic comparison tolerance for derived quantities.
//! - [`safe_logistic(x)`]: overflow-free `σ(x)`.
//! - [`log_logistic(x)`]: `ln σ(x)` without cancellation in the tails.
//! - [`clamp_probability(p)`]: project `p` into `[PROB_EPS, 1 − PROB_EPS]`.

/// Distance from the asymptotes 0 and 1 that probabilities are clamped to.
///
/// Keeps `ln(p)`, `ln(1 − p)` and `1 / (p (1 − p))` finite for items whose
/// response curve is numerically flat at the current ability.
pub const PROB_EPS: f64 = 1e-10;

/// Eigenvalues with magnitude at most this value are treated as zero when
/// deciding whether a curvature matrix is definite.
pub const EIGEN_EPS: f64 = 1e-12;

/// Generic tolerance for comparisons of derived floating-point quantities.
pub const GENERAL_TOL: f64 = 1e-9;

/// Numerically stable logistic function `σ(x) = 1 / (1 + exp(−x))`.
///
/// Uses the sign split `σ(x) = exp(x) / (1 + exp(x))` for negative `x` so
/// that `exp` is only ever evaluated on non-positive arguments.
///
/// # Parameters
/// - `x`: real input
///
/// # Returns
/// - `σ(x)` in `[0, 1]`; exactly 0 or 1 only under `f64` underflow.
pub fn safe_logistic(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Stable `ln σ(x) = −softplus(−x)`.
///
/// For large positive `x` the result tends to `0⁻`, for large negative `x`
/// it tends to `x`; both tails avoid `ln(0)`.
pub fn log_logistic(x: f64) -> f64 {
    if x > 20.0 {
        -(-x).exp()
    } else if x < -20.0 {
        x
    } else {
        -(-x).exp().ln_1p()
    }
}

/// Clamp a probability into `[PROB_EPS, 1 − PROB_EPS]`.
///
/// Non-finite inputs are mapped to `0.5` so that a single degenerate item
/// cannot poison an aggregated likelihood with `NaN`.
pub fn clamp_probability(p: f64) -> f64 {
    if !p.is_finite() {
        return 0.5;
    }
    p.clamp(PROB_EPS, 1.0 - PROB_EPS)
}
