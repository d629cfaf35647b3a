//! The score-function interface consumed by the Newton solver.
use ndarray::Array1;
use std::cell::RefCell;

use crate::{
    codec::{ParamTree, try_decode, try_encode},
    optimization::{
        errors::{OptError, OptResult},
        loglik_optimizer::{
            finite_diff::compute_hessian,
            types::{Grad, Hessian, Theta},
            validation::validate_grad,
        },
    },
};

/// Gradient and curvature of an objective to be maximized, expressed on
/// parameter trees.
///
/// Required:
/// - `gradient(point)`: `∂f/∂φ` with the same shape as `point`.
///
/// Optional:
/// - `hessian(point)`: second partials in encoding order of `point`.
///   Defaults to finite differences of `gradient`.
/// - `value(point)`: objective value; when present the solver halves steps
///   that decrease it.
/// - `trusted_region(point)`: projection applied to every accepted iterate
///   (e.g. clamping a guessing parameter to `[0, 1)`).
pub trait ScoreFunction {
    fn gradient(&self, point: &ParamTree) -> OptResult<ParamTree>;

    fn hessian(&self, point: &ParamTree) -> OptResult<Hessian> {
        finite_difference_hessian(self, point)
    }

    fn value(&self, _point: &ParamTree) -> Option<OptResult<f64>> {
        None
    }

    fn trusted_region(&self, point: ParamTree) -> ParamTree {
        point
    }
}

/// Encode a gradient tree and check it against the parameter dimension.
///
/// # Errors
/// - `OptError::EncodingFailed` when the tree does not encode.
/// - `OptError::GradientDimMismatch` / `OptError::InvalidGradient`.
pub fn flatten_gradient(gradient: &ParamTree, dim: usize) -> OptResult<Grad> {
    let encoded = try_encode(gradient)?;
    validate_grad(&encoded.vector, dim)?;
    Ok(encoded.vector)
}

/// Finite-difference Hessian of `score.gradient` around `point`.
///
/// Every perturbed vector is decoded back into the shape of `point`, so the
/// gradient implementation never sees flat vectors. The first failure of
/// the gradient is parked and returned after differencing.
pub fn finite_difference_hessian<S: ScoreFunction + ?Sized>(
    score: &S, point: &ParamTree,
) -> OptResult<Hessian> {
    let encoded = try_encode(point)?;
    let dim = encoded.vector.len();
    let failure: RefCell<Option<OptError>> = RefCell::new(None);
    let grad_fn = |x: &Theta| -> Grad {
        let evaluated = try_decode(x, &encoded.descriptor)
            .map_err(OptError::from)
            .and_then(|p| score.gradient(&p))
            .and_then(|g| flatten_gradient(&g, dim));
        match evaluated {
            Ok(g) => g,
            Err(e) => {
                failure.borrow_mut().get_or_insert(e);
                Array1::from_elem(dim, f64::NAN)
            }
        }
    };
    let hessian = compute_hessian(&grad_fn, &encoded.vector);
    if let Some(err) = failure.into_inner() {
        return Err(err);
    }
    hessian
}
