//! Curvature stabilization and the Newton step solve.
//!
//! A maximization step needs a negative-definite Hessian. When the largest
//! eigenvalue `λ_max` of the symmetric part is above `-ridge`, the matrix is
//! shifted to `H − (λ_max + ridge) I`, which moves every eigenvalue down by
//! the same amount and leaves `λ_max = -ridge`. The step then solves
//! `(-H) Δ = g` by Cholesky.
use nalgebra::{Cholesky, DMatrix, DVector};
use ndarray::Array1;

use crate::optimization::loglik_optimizer::types::{Grad, Hessian};

/// Hessian after stabilization.
#[derive(Debug, Clone, PartialEq)]
pub struct Stabilized {
    pub matrix: Hessian,
    /// `true` when the ridge shift was applied.
    pub shifted: bool,
    /// Largest eigenvalue before the shift.
    pub max_eigenvalue: f64,
}

/// Make `hessian` negative definite with margin `ridge`.
///
/// Assumes a square matrix with finite entries (see `validate_hessian`).
pub fn stabilize(hessian: &Hessian, ridge: f64) -> Stabilized {
    let n = hessian.nrows();
    let symmetric = DMatrix::from_fn(n, n, |i, j| 0.5 * (hessian[[i, j]] + hessian[[j, i]]));
    let max_eigenvalue = symmetric.symmetric_eigen().eigenvalues.max();
    if max_eigenvalue < -ridge {
        return Stabilized { matrix: hessian.clone(), shifted: false, max_eigenvalue };
    }
    let mut matrix = hessian.clone();
    let shift = max_eigenvalue + ridge;
    for i in 0..n {
        matrix[[i, i]] -= shift;
    }
    Stabilized { matrix, shifted: true, max_eigenvalue }
}

/// Solve `hessian · Δ = -grad` for a negative-definite `hessian`.
///
/// Returns `None` when the Cholesky factorization of `-hessian` fails.
pub fn newton_direction(hessian: &Hessian, grad: &Grad) -> Option<Array1<f64>> {
    let n = hessian.nrows();
    let neg = DMatrix::from_fn(n, n, |i, j| -hessian[[i, j]]);
    let rhs = DVector::from_iterator(n, grad.iter().copied());
    let chol = Cholesky::new(neg)?;
    let delta = chol.solve(&rhs);
    Some(Array1::from_iter(delta.iter().copied()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover the ridge shift on definite, singular and indefinite
    // matrices, and the Cholesky step solve.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // A negative-definite Hessian must pass through untouched.
    //
    // Given
    // -----
    // - `diag(-2, -1)` and ridge 1e-4.
    //
    // Expect
    // ------
    // - No shift, identical matrix.
    fn negative_definite_hessian_is_unchanged() {
        let h = array![[-2.0, 0.0], [0.0, -1.0]];

        let out = stabilize(&h, 1e-4);

        assert!(!out.shifted);
        assert_eq!(out.matrix, h);
        assert_relative_eq!(out.max_eigenvalue, -1.0, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Singular and indefinite matrices must be shifted to `λ_max = -ridge`.
    //
    // Given
    // -----
    // - The zero matrix and `diag(3, -1)`, ridge 0.5.
    //
    // Expect
    // ------
    // - `-0.5 I` and `diag(-0.5, -4.5)`.
    fn singular_and_indefinite_hessians_are_shifted() {
        let zero = array![[0.0, 0.0], [0.0, 0.0]];
        let indefinite = array![[3.0, 0.0], [0.0, -1.0]];

        let z = stabilize(&zero, 0.5);
        let i = stabilize(&indefinite, 0.5);

        assert!(z.shifted && i.shifted);
        assert_eq!(z.matrix, array![[-0.5, 0.0], [0.0, -0.5]]);
        assert_relative_eq!(i.matrix[[0, 0]], -0.5, epsilon = 1e-12);
        assert_relative_eq!(i.matrix[[1, 1]], -4.5, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Verify the step solve.
    //
    // Given
    // -----
    // - `H = [[-2, 0.5], [0.5, -1]]`, `g = (1, 0)`.
    //
    // Expect
    // ------
    // - `H Δ = -g`.
    fn newton_direction_solves_linear_system() {
        let h = array![[-2.0, 0.5], [0.5, -1.0]];
        let g = array![1.0, 0.0];

        let delta = newton_direction(&h, &g).expect("negative-definite system");
        let residual = h.dot(&delta) + &g;

        assert!(residual.iter().all(|r| r.abs() < 1e-12));
    }
}
