//! loglik_optimizer — Argmin-backed L-BFGS maximizer and derivative helpers.
//!
//! Purpose
//! -------
//! Maximize a log-likelihood `ℓ(θ)` with L-BFGS when the damped Newton
//! iteration cannot be trusted, and provide the finite-difference and
//! validation helpers the Newton solver relies on.
//!
//! Key behaviors
//! -------------
//! - [`adapter::ArgMinAdapter`] turns a [`LogLikelihood`] into the cost
//!   `c(θ) = -ℓ(θ)` with a matching gradient (analytic or finite-difference).
//! - [`maximize`] validates the start point, builds the solver for the
//!   chosen [`traits::LineSearcher`] and runs it through [`run::run_lbfgs`].
//! - [`finite_diff::compute_hessian`] supplies the default curvature of a
//!   score function that only implements a gradient.
//!
//! Invariants & assumptions
//! ------------------------
//! - Objectives report invalid inputs as `OptError`, never by panicking.
//! - [`Tolerances`] and [`MLEOptions`] are validated on construction.
//!
//! Downstream usage
//! ----------------
//! - `estimation::item` falls back to [`maximize`] for log-likelihood item
//!   calibration when the Newton run is unconverged.
//! - `optimization::newton::ScoreFunction` uses `finite_diff` and
//!   `validation`.
//!
//! Testing notes
//! -------------
//! - Unit tests cover adapter sign conventions, builder wiring, option
//!   validation, outcome mapping and the finite-difference helpers.

pub mod adapter;
pub mod api;
pub mod builders;
pub mod finite_diff;
pub mod run;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::maximize;
pub use self::traits::{LineSearcher, LogLikelihood, MLEOptions, OptimOutcome, Tolerances};
pub use self::types::{Cost, DEFAULT_LBFGS_MEM, FnEvalMap, Grad, Hessian, Theta};

pub mod prelude {
    pub use super::api::maximize;
    pub use super::traits::{LineSearcher, LogLikelihood, MLEOptions, OptimOutcome, Tolerances};
    pub use super::types::{Cost, Grad, Hessian, Theta};
}
