//! optimization — Newton solver, L-BFGS fallback, numerical helpers, errors.
//!
//! Purpose
//! -------
//! Provide the numerical machinery behind ability and item estimation: a
//! damped Newton–Raphson solver over nested parameter trees, an
//! Argmin-backed L-BFGS maximizer, guarded logistic transforms, and one
//! error surface for all of them.
//!
//! Key behaviors
//! -------------
//! - `newton`: [`newton::solve`] driven by a [`newton::ScoreFunction`].
//! - `loglik_optimizer`: [`loglik_optimizer::maximize`] for a
//!   [`loglik_optimizer::LogLikelihood`], plus finite-difference and
//!   validation helpers.
//! - `numerical_stability`: stable logistic, log-logistic and probability
//!   clamping.
//! - `errors`: [`errors::OptError`] / [`errors::OptResult`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Every solver maximizes. Argmin minimizes, so the L-BFGS adapter
//!   negates; the Newton solver works on the objective directly.
//! - Invalid states are reported as `OptError`, never by panicking.
//!
//! Conventions
//! -----------
//! - Vectors and matrices use the `ndarray` aliases of
//!   `loglik_optimizer::types`; `nalgebra` is used internally for
//!   eigen/Cholesky work only.
//! - No I/O unless the `obs_slog` feature is enabled and a caller sets a
//!   `verbose` flag.
//!
//! Downstream usage
//! ----------------
//! - `models` implement `ScoreFunction` for ability and item problems.
//! - `estimation` drives both solvers and maps `OptError` into
//!   `EstimatorError`.
//!
//! Testing notes
//! -------------
//! - Each submodule carries its own unit tests; integration tests under
//!   `tests/` exercise the solver through the estimator.

pub mod errors;
#[cfg(feature = "obs_slog")]
pub mod logging;
pub mod loglik_optimizer;
pub mod newton;
pub mod numerical_stability;

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::loglik_optimizer::prelude::*;
    pub use super::newton::prelude::*;
    pub use super::numerical_stability::prelude::*;
}
