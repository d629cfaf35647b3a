//! Shape and finiteness checks shared by the optimizers.
//!
//! Tolerance checks accept `None` and otherwise require a finite, strictly
//! positive value. Vector/matrix checks report the first offending entry.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{Grad, Theta, types::Hessian},
};

/// Reason string for a value that is not finite and strictly positive.
pub(crate) fn positive_finite_reason(value: f64) -> Option<&'static str> {
    if !value.is_finite() {
        Some("Tolerance must be finite.")
    } else if value <= 0.0 {
        Some("Tolerance must be positive.")
    } else {
        None
    }
}

/// # Errors
/// [`OptError::InvalidTolGrad`] if the value is non-finite or ≤ 0.
pub fn verify_tol_grad(tol: Option<f64>) -> OptResult<()> {
    match tol.and_then(|t| positive_finite_reason(t).map(|r| (t, r))) {
        Some((tol, reason)) => Err(OptError::InvalidTolGrad { tol, reason }),
        None => Ok(()),
    }
}

/// # Errors
/// [`OptError::InvalidTolCost`] if the value is non-finite or ≤ 0.
pub fn verify_tol_cost(tol: Option<f64>) -> OptResult<()> {
    match tol.and_then(|t| positive_finite_reason(t).map(|r| (t, r))) {
        Some((tol, reason)) => Err(OptError::InvalidTolCost { tol, reason }),
        None => Ok(()),
    }
}

/// Check gradient length and finiteness.
///
/// # Errors
/// - [`OptError::GradientDimMismatch`] if `grad.len() != dim`.
/// - [`OptError::InvalidGradient`] for the first non-finite entry.
pub fn validate_grad(grad: &Grad, dim: usize) -> OptResult<()> {
    if grad.len() != dim {
        return Err(OptError::GradientDimMismatch { expected: dim, found: grad.len() });
    }
    match grad.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(OptError::InvalidGradient {
            index,
            value: grad[index],
            reason: "Gradient elements must be finite.",
        }),
        None => Ok(()),
    }
}

/// Unwrap an estimate, requiring every entry to be finite.
///
/// # Errors
/// - [`OptError::MissingThetaHat`] for `None`.
/// - [`OptError::InvalidThetaHat`] for the first non-finite entry.
pub fn validate_theta_hat(theta_hat: Option<Theta>) -> OptResult<Theta> {
    let theta = theta_hat.ok_or(OptError::MissingThetaHat)?;
    match theta.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(OptError::InvalidThetaHat {
            index,
            value: theta[index],
            reason: "Parameter estimates must be finite.",
        }),
        None => Ok(theta),
    }
}

/// # Errors
/// [`OptError::NonFiniteCost`] if `value` is NaN or infinite.
pub fn validate_value(value: f64) -> OptResult<()> {
    if !value.is_finite() {
        return Err(OptError::NonFiniteCost { value });
    }
    Ok(())
}

/// Check that `hessian` is `dim × dim` with finite entries.
///
/// # Errors
/// - [`OptError::HessianDimMismatch`] on a shape mismatch.
/// - [`OptError::InvalidHessian`] for the first non-finite entry.
pub fn validate_hessian(hessian: &Hessian, dim: usize) -> OptResult<()> {
    if hessian.nrows() != dim || hessian.ncols() != dim {
        return Err(OptError::HessianDimMismatch {
            expected: dim,
            found: (hessian.nrows(), hessian.ncols()),
        });
    }
    match hessian.indexed_iter().find(|(_, v)| !v.is_finite()) {
        Some(((row, col), &value)) => Err(OptError::InvalidHessian { row, col, value }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover the first-offender reporting of the vector and
    // matrix checks and the tolerance reasons.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Verify that the first non-finite entry is reported.
    //
    // Given
    // -----
    // - A gradient `[1, NaN, inf]`, a Hessian with `inf` at (1, 0), and a
    //   3-vector checked against dimension 2.
    //
    // Expect
    // ------
    // - Index 1 for the gradient, (1, 0) for the Hessian, a dimension
    //   mismatch for the short check.
    fn validators_report_first_offender() {
        let grad = array![1.0, f64::NAN, f64::INFINITY];
        let hess = array![[1.0, 0.0], [f64::INFINITY, 1.0]];

        assert!(matches!(validate_grad(&grad, 3), Err(OptError::InvalidGradient { index: 1, .. })));
        assert_eq!(
            validate_grad(&grad, 2),
            Err(OptError::GradientDimMismatch { expected: 2, found: 3 })
        );
        assert!(matches!(
            validate_hessian(&hess, 2),
            Err(OptError::InvalidHessian { row: 1, col: 0, .. })
        ));
        assert_eq!(validate_theta_hat(None), Err(OptError::MissingThetaHat));
    }

    #[test]
    // Purpose
    // -------
    // Check tolerance reasons.
    //
    // Given
    // -----
    // - `None`, `Some(0)`, `Some(NaN)`.
    //
    // Expect
    // ------
    // - `Ok` for `None`, the positivity and finiteness reasons otherwise.
    fn tolerance_checks_explain_rejections() {
        assert_eq!(verify_tol_grad(None), Ok(()));
        assert_eq!(
            verify_tol_cost(Some(0.0)),
            Err(OptError::InvalidTolCost { tol: 0.0, reason: "Tolerance must be positive." })
        );
        assert!(matches!(
            verify_tol_grad(Some(f64::NAN)),
            Err(OptError::InvalidTolGrad { reason: "Tolerance must be finite.", .. })
        ));
    }
}
