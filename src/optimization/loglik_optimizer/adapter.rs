//! Bridge from [`LogLikelihood`] to Argmin's minimization traits.
//!
//! Cost is `c(θ) = -ℓ(θ)`. An analytic `∇ℓ` is validated and negated; a
//! missing gradient is replaced by finite differences of the cost itself,
//! central first, forward on failure.
use std::cell::RefCell;

use crate::optimization::{
    errors::OptError,
    loglik_optimizer::{
        finite_diff::run_fd_diff,
        traits::LogLikelihood,
        types::{Cost, Grad, Theta},
        validation::validate_grad,
    },
};
use argmin::core::{CostFunction, Error, Gradient};
use finitediff::FiniteDiff;

/// Argmin view of a log-likelihood and its data.
#[derive(Debug, Clone)]
pub struct ArgMinAdapter<'a, F: LogLikelihood> {
    pub f: &'a F,
    pub data: &'a F::Data,
}

impl<'a, F: LogLikelihood> ArgMinAdapter<'a, F> {
    pub fn new(f: &'a F, data: &'a F::Data) -> Self {
        Self { f, data }
    }

    fn fd_gradient(&self, theta: &Theta) -> Result<Grad, Error> {
        let closure_err: RefCell<Option<Error>> = RefCell::new(None);
        let cost_func = |x: &Theta| -> f64 {
            match self.cost(x) {
                Ok(val) => val,
                Err(e) => {
                    let mut slot = closure_err.borrow_mut();
                    if slot.is_none() {
                        *slot = Some(e);
                    }
                    f64::NAN
                }
            }
        };
        let central = theta.central_diff(&cost_func);
        if closure_err.borrow().is_none() && validate_grad(&central, theta.len()).is_ok() {
            return Ok(central);
        }
        Ok(run_fd_diff(theta, &cost_func, &closure_err)?)
    }
}

impl<'a, F: LogLikelihood> CostFunction for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Output = Cost;

    /// # Errors
    /// - Any `OptError` from `value`.
    /// - [`OptError::NonFiniteCost`] when `ℓ(θ)` is not finite.
    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        let output = self.f.value(theta, self.data)?;
        if !output.is_finite() {
            return Err((OptError::NonFiniteCost { value: output }).into());
        }
        Ok(-output)
    }
}

impl<'a, F: LogLikelihood> Gradient for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Gradient = Grad;

    /// # Errors
    /// - User errors from `grad` other than `GradientNotImplemented`.
    /// - Validation errors on the analytic or finite-difference gradient.
    /// - Cost failures raised while differencing.
    fn gradient(&self, theta: &Self::Param) -> Result<Self::Gradient, Error> {
        match self.f.grad(theta, self.data) {
            Ok(g) => {
                validate_grad(&g, theta.len())?;
                Ok(-g)
            }
            Err(OptError::GradientNotImplemented) => self.fd_gradient(theta),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::errors::OptResult;
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover the sign conventions of the adapter for analytic
    // and finite-difference gradients, and rejection of non-finite values.
    // -------------------------------------------------------------------------

    /// Bernoulli log-likelihood of `k` successes in `n` trials, logit scale.
    struct Binomial {
        analytic: bool,
    }

    impl LogLikelihood for Binomial {
        type Data = (f64, f64);

        fn value(&self, theta: &Theta, data: &Self::Data) -> OptResult<Cost> {
            let (k, n) = *data;
            let p = 1.0 / (1.0 + (-theta[0]).exp());
            Ok(k * p.ln() + (n - k) * (1.0 - p).ln())
        }

        fn check(&self, _theta: &Theta, _data: &Self::Data) -> OptResult<()> {
            Ok(())
        }

        fn grad(&self, theta: &Theta, data: &Self::Data) -> OptResult<Grad> {
            if !self.analytic {
                return Err(OptError::GradientNotImplemented);
            }
            let (k, n) = *data;
            let p = 1.0 / (1.0 + (-theta[0]).exp());
            Ok(array![k - n * p])
        }
    }

    #[test]
    // Purpose
    // -------
    // Verify that both gradient paths return the cost gradient `-∇ℓ`.
    //
    // Given
    // -----
    // - 7 successes in 10 trials at logit 0.
    //
    // Expect
    // ------
    // - Cost gradient `-(7 − 5) = −2` from both paths; cost equals `-ℓ`.
    fn analytic_and_fd_gradients_agree_on_sign() {
        // Arrange
        let data = (7.0, 10.0);
        let analytic = Binomial { analytic: true };
        let numeric = Binomial { analytic: false };
        let theta = array![0.0];

        // Act
        let g_a = ArgMinAdapter::new(&analytic, &data).gradient(&theta).expect("analytic grad");
        let g_n = ArgMinAdapter::new(&numeric, &data).gradient(&theta).expect("fd grad");
        let cost = ArgMinAdapter::new(&analytic, &data).cost(&theta).expect("cost");

        // Assert
        assert_relative_eq!(g_a[0], -2.0, epsilon = 1e-12);
        assert_relative_eq!(g_n[0], -2.0, epsilon = 1e-5);
        assert_relative_eq!(cost, -10.0 * 0.5_f64.ln(), epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Ensure a non-finite log-likelihood is rejected.
    //
    // Given
    // -----
    // - All 10 trials successful and logit −800, so `ln p = −∞`.
    //
    // Expect
    // ------
    // - `cost` fails with `NonFiniteCost`.
    fn non_finite_loglik_is_rejected() {
        let data = (10.0, 10.0);
        let model = Binomial { analytic: true };

        let err = ArgMinAdapter::new(&model, &data).cost(&array![-800.0]).expect_err("must fail");

        assert!(matches!(OptError::from(err), OptError::NonFiniteCost { .. }));
    }
}
