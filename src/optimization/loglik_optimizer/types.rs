//! loglik_optimizer::types — numeric aliases and L-BFGS wiring.
//!
//! Purpose
//! -------
//! Name the `ndarray` containers and Argmin solver generics once, so the
//! Newton solver, the L-BFGS fallback and the response models agree on the
//! same parameter/gradient/curvature shapes.
//!
//! Conventions
//! -----------
//! - `Theta` is the flat parameter vector produced by `codec::encode`;
//!   `Grad` has the same length and ordering.
//! - `Hessian` is dense, `theta.len() × theta.len()`, in encoding order.
//! - `Cost` is a scalar; the L-BFGS adapter stores `-ℓ(θ)` in it.
use argmin::solver::{
    linesearch::{HagerZhangLineSearch, MoreThuenteLineSearch},
    quasinewton::LBFGS,
};
use ndarray::{Array1, Array2};
use std::collections::HashMap;

/// Flat parameter vector (item parameters or a one-element ability vector).
pub type Theta = Array1<f64>;

/// Gradient of the log-likelihood (or of the cost inside the adapter).
pub type Grad = Array1<f64>;

/// Dense matrix of second partials in encoding order.
pub type Hessian = Array2<f64>;

/// Scalar objective value handed to Argmin.
pub type Cost = f64;

/// Function-evaluation counters keyed by Argmin's counter names.
pub type FnEvalMap = HashMap<String, u64>;

/// Default L-BFGS history size. Item parameter vectors have at most four
/// entries, so a short history already spans the whole space.
pub const DEFAULT_LBFGS_MEM: usize = 5;

pub type HagerZhangLS = HagerZhangLineSearch<Theta, Grad, Cost>;
pub type MoreThuenteLS = MoreThuenteLineSearch<Theta, Grad, Cost>;
pub type LbfgsHagerZhang = LBFGS<HagerZhangLS, Theta, Grad, Cost>;
pub type LbfgsMoreThuente = LBFGS<MoreThuenteLS, Theta, Grad, Cost>;
