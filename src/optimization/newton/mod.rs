//! newton — damped multivariate Newton–Raphson on parameter trees.
//!
//! Purpose
//! -------
//! Find the stationary point of a concave objective (a log-likelihood, a
//! log-posterior, or a negated least-squares loss) given its gradient and
//! curvature, for arbitrarily nested parameter shapes.
//!
//! Key behaviors
//! -------------
//! - [`ScoreFunction`] is the seam between models and the solver. Models
//!   return gradients as [`crate::codec::ParamTree`]s shaped like the point.
//! - [`solve`] encodes the initial guess once, decodes every iterate before
//!   calling the score function, and returns the estimate in the original
//!   shape.
//! - [`stabilize`] ridge-shifts singular or indefinite Hessians so every
//!   step is an ascent step; steps are length-capped and optionally halved.
//!
//! Invariants & assumptions
//! ------------------------
//! - Identically zero gradient and curvature return the initial guess.
//! - Running out of iterations is not an error: the last iterate is
//!   returned with `converged = false`.
//!
//! Conventions
//! -----------
//! - Hessians are in encoding order of the point (depth-first, first seen).
//! - Options are validated once in [`NewtonOptions::new`].
//!
//! Testing notes
//! -------------
//! - Solver tests cover idempotence, nested shapes, projection, wrong-signed
//!   curvature, and the unconverged outcome; stabilizer and option tests
//!   live next to their code.

pub mod options;
pub mod score;
pub mod solver;
pub mod stabilize;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::options::NewtonOptions;
pub use self::score::{ScoreFunction, finite_difference_hessian, flatten_gradient};
pub use self::solver::{NewtonOutcome, NewtonStatus, solve};
pub use self::stabilize::{Stabilized, newton_direction, stabilize};

pub mod prelude {
    pub use super::options::NewtonOptions;
    pub use super::score::ScoreFunction;
    pub use super::solver::{NewtonOutcome, NewtonStatus, solve};
}
