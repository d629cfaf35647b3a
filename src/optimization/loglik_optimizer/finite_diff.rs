//! loglik_optimizer::finite_diff — finite-difference gradients and Hessians.
//!
//! Purpose
//! -------
//! Supply derivatives when an objective does not provide them analytically:
//! forward-difference gradients for the L-BFGS adapter, and
//! central-difference Hessians (forward fallback) for score functions that
//! only implement a gradient.
//!
//! Invariants & assumptions
//! ------------------------
//! - Closures passed to `finitediff` must return plain numbers, so failures
//!   inside them are parked in a `RefCell` and the closure returns `NaN`;
//!   a parked error always wins over the numeric result.
//! - Returned gradients satisfy [`validate_grad`]; returned Hessians satisfy
//!   [`validate_hessian`] and are exactly symmetric.
//!
//! Downstream usage
//! ----------------
//! - `adapter::ArgMinAdapter` calls [`run_fd_diff`].
//! - `newton::ScoreFunction::hessian` (default method) calls
//!   [`compute_hessian`] on the encoded gradient.
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        Grad, Theta,
        types::Hessian,
        validation::{validate_grad, validate_hessian},
    },
};
use argmin::core::Error;
use finitediff::FiniteDiff;
use std::cell::RefCell;

/// Forward-difference gradient of `func` at `theta`.
///
/// Parameters
/// ----------
/// - `theta`: `&Theta`
///   Evaluation point; its length fixes the gradient dimension.
/// - `func`: `&G`
///   Scalar objective. Expected to store failures in `closure_err` and
///   return `NaN`.
/// - `closure_err`: `&RefCell<Option<Error>>`
///   Error slot, cleared on entry and inspected after differencing.
///
/// Errors
/// ------
/// - Any error parked in `closure_err`, converted to `OptError`.
/// - `OptError::GradientDimMismatch` / `OptError::InvalidGradient` from
///   [`validate_grad`].
pub fn run_fd_diff<G: Fn(&Theta) -> f64>(
    theta: &Theta, func: &G, closure_err: &RefCell<Option<Error>>,
) -> OptResult<Grad> {
    closure_err.replace(None);
    let fd_grad = theta.forward_diff(func);
    if let Some(err) = closure_err.take() {
        return Err(err.into());
    }
    validate_grad(&fd_grad, theta.len())?;
    Ok(fd_grad)
}

/// Hessian of a gradient map `f` at `theta`.
///
/// Central differences first; when the central matrix fails validation
/// (wrong shape or non-finite entries) forward differences are tried and
/// only their validation result is reported. The accepted matrix is
/// symmetrized by averaging off-diagonal pairs.
///
/// Errors
/// ------
/// - `OptError::HessianDimMismatch` / `OptError::InvalidHessian` when the
///   forward-difference fallback also fails validation.
pub fn compute_hessian<F: Fn(&Theta) -> Grad>(f: &F, theta: &Theta) -> OptResult<Hessian> {
    let dim = theta.len();
    let mut cent_hess = theta.central_hessian(f);
    if validate_hessian(&cent_hess, dim).is_ok() {
        symmetrize_hess(&mut cent_hess);
        return Ok(cent_hess);
    }
    let mut forward_hess = theta.forward_hessian(f);
    validate_hessian(&forward_hess, dim)?;
    symmetrize_hess(&mut forward_hess);
    Ok(forward_hess)
}

// ---- Helper methods ----

fn symmetrize_hess(hess: &mut Hessian) {
    for i in 0..hess.nrows() {
        for j in 0..i {
            let avg = 0.5 * (hess[[i, j]] + hess[[j, i]]);
            hess[[i, j]] = avg;
            hess[[j, i]] = avg;
        }
    }
}
