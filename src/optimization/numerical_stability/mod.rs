//! numerical_stability — guarded scalar transforms and shared tolerances.
//!
//! Purpose
//! -------
//! Collect the numerically stable logistic helpers and the small tolerances
//! shared by the response models, the Newton solver and the scale
//! statistics. Centralizing them keeps every likelihood evaluation inside a
//! well-conditioned `f64` regime.
//!
//! Key behaviors
//! -------------
//! - Provide an overflow-free logistic (`safe_logistic`) and log-logistic
//!   (`log_logistic`).
//! - Clamp probabilities away from 0 and 1 (`clamp_probability`) before
//!   logarithms or Fisher-information denominators are formed.
//! - Export `PROB_EPS`, `EIGEN_EPS` and `GENERAL_TOL` so that downstream
//!   modules share one set of guards.
//!
//! Conventions
//! -----------
//! - Pure functions on `f64`; no logging, no allocation, no global state.
//!
//! Testing notes
//! -------------
//! - Unit tests in [`transformations`] compare against naïve formulas on
//!   safe grids and check tail behavior.

pub mod transformations;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::transformations::{
    EIGEN_EPS, GENERAL_TOL, PROB_EPS, clamp_probability, log_logistic, safe_logistic,
};

pub mod prelude {
    pub use super::transformations::{
        EIGEN_EPS, GENERAL_TOL, PROB_EPS, clamp_probability, log_logistic, safe_logistic,
    };
}
