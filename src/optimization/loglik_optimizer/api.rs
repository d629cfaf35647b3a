//! Entry point of the L-BFGS maximizer.
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        OptimOutcome, Theta,
        adapter::ArgMinAdapter,
        builders::build_lbfgs,
        run::run_lbfgs,
        traits::{LineSearcher, LogLikelihood, MLEOptions},
        types::{HagerZhangLS, MoreThuenteLS},
    },
};

/// Maximize `ℓ(θ)` with L-BFGS.
///
/// Validates `theta0` through `f.check`, wraps `(f, data)` in an
/// [`ArgMinAdapter`] (which minimizes `-ℓ`), builds the solver for
/// `opts.line_searcher`, and runs it.
///
/// # Errors
/// - Errors from `f.check`.
/// - Builder errors (rejected tolerances).
/// - Runtime errors of the solver and validation errors of the outcome.
///
/// # Example
/// ```
/// use ndarray::{array, Array1};
/// use rust_irt::optimization::errors::OptResult;
/// use rust_irt::optimization::loglik_optimizer::{maximize, LogLikelihood, MLEOptions};
///
/// struct Concave;
/// impl LogLikelihood for Concave {
///     type Data = ();
///     fn value(&self, theta: &Array1<f64>, _: &()) -> OptResult<f64> {
///         Ok(-(theta[0] - 1.5).powi(2))
///     }
///     fn check(&self, _: &Array1<f64>, _: &()) -> OptResult<()> {
///         Ok(())
///     }
/// }
///
/// let out = maximize(&Concave, array![0.0], &(), &MLEOptions::default())?;
/// assert!((out.theta_hat[0] - 1.5).abs() < 1e-4);
/// # Ok::<(), rust_irt::optimization::errors::OptError>(())
/// ```
pub fn maximize<F: LogLikelihood>(
    f: &F, theta0: Theta, data: &F::Data, opts: &MLEOptions,
) -> OptResult<OptimOutcome> {
    f.check(&theta0, data)?;
    let problem = ArgMinAdapter::new(f, data);
    match opts.line_searcher {
        LineSearcher::MoreThuente => {
            run_lbfgs(theta0, opts, problem, build_lbfgs(MoreThuenteLS::new(), opts)?)
        }
        LineSearcher::HagerZhang => {
            run_lbfgs(theta0, opts, problem, build_lbfgs(HagerZhangLS::new(), opts)?)
        }
    }
}
