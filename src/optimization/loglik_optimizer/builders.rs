//! loglik_optimizer::builders — L-BFGS construction.
//!
//! Purpose
//! -------
//! Build an L-BFGS solver for any line search and apply the optional
//! tolerances of [`MLEOptions`]. Initial parameters and the iteration cap
//! are runtime concerns applied by `run::run_lbfgs`.
//!
//! Invariants & assumptions
//! ------------------------
//! - History size is `opts.lbfgs_mem` or [`DEFAULT_LBFGS_MEM`].
//! - Argmin rejections of a tolerance surface as `OptError` through the
//!   crate's `From<argmin::core::Error>` conversion.
use argmin::solver::quasinewton::LBFGS;

use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        traits::MLEOptions,
        types::{Cost, DEFAULT_LBFGS_MEM, Grad, Theta},
    },
};

/// Construct L-BFGS around `line_search` with the tolerances of `opts`.
///
/// Parameters
/// ----------
/// - `line_search`: `L`
///   A line search over `(Theta, Grad, Cost)`, e.g. `HagerZhangLS::new()`.
/// - `opts`: `&MLEOptions`
///   Source of `lbfgs_mem`, `tols.tol_grad` and `tols.tol_cost`. `None`
///   tolerances keep Argmin's defaults.
///
/// Errors
/// ------
/// - `OptError` converted from Argmin when a tolerance is rejected.
pub fn build_lbfgs<L>(line_search: L, opts: &MLEOptions) -> OptResult<LBFGS<L, Theta, Grad, Cost>> {
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    let mut solver = LBFGS::new(line_search, mem);
    if let Some(g) = opts.tols.tol_grad {
        solver = solver.with_tolerance_grad(g)?;
    }
    if let Some(c) = opts.tols.tol_cost {
        solver = solver.with_tolerance_cost(c)?;
    }
    Ok(solver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::loglik_optimizer::{
        traits::{LineSearcher, Tolerances},
        types::{HagerZhangLS, MoreThuenteLS},
    };

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover solver construction for both line searches, with
    // default and explicit history sizes and with absent tolerances.
    // End-to-end runs are covered by the item calibration tests.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Ensure construction succeeds for both line searches and both memory
    // settings.
    //
    // Given
    // -----
    // - Valid tolerances with gradient and cost rules.
    // - `lbfgs_mem` of `None` and `Some(3)`.
    //
    // Expect
    // ------
    // - Every combination builds.
    fn build_lbfgs_accepts_both_line_searches() {
        // Arrange
        let tols = Tolerances::new(Some(1e-6), Some(1e-9), Some(50)).expect("valid tolerances");
        let default_mem = MLEOptions::new(tols, LineSearcher::HagerZhang, false, None)
            .expect("valid options");
        let explicit_mem = MLEOptions::new(tols, LineSearcher::MoreThuente, false, Some(3))
            .expect("valid options");

        // Act / Assert
        assert!(build_lbfgs(HagerZhangLS::new(), &default_mem).is_ok());
        assert!(build_lbfgs(MoreThuenteLS::new(), &default_mem).is_ok());
        assert!(build_lbfgs(HagerZhangLS::new(), &explicit_mem).is_ok());
        assert!(build_lbfgs(MoreThuenteLS::new(), &explicit_mem).is_ok());
    }

    #[test]
    // Purpose
    // -------
    // Verify that an iteration-only stopping rule keeps Argmin's tolerance
    // defaults.
    //
    // Given
    // -----
    // - `Tolerances { tol_grad: None, tol_cost: None, max_iter: Some(20) }`.
    //
    // Expect
    // ------
    // - Construction succeeds.
    fn build_lbfgs_without_tolerances() {
        let tols = Tolerances::new(None, None, Some(20)).expect("valid tolerances");
        let opts =
            MLEOptions::new(tols, LineSearcher::MoreThuente, false, None).expect("valid options");

        assert!(build_lbfgs(MoreThuenteLS::new(), &opts).is_ok());
    }
}
