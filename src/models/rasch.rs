//! Rasch (one-parameter logistic) model: `p = σ(θ − b)`.
use crate::models::{
    params::DIFFICULTY,
    traits::{ModelKind, ResponseModel},
};

#[derive(Debug, Clone, Copy, Default)]
pub struct Rasch;

impl ResponseModel for Rasch {
    fn kind(&self) -> ModelKind {
        ModelKind::Rasch
    }

    fn parameter_names(&self) -> &'static [&'static str] {
        &[DIFFICULTY]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::params::ItemParams;
    use approx::assert_relative_eq;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // The Rasch model reduces to σ(θ − b) with unit slope; these tests pin
    // that reduction and the one-dimensional jacobian/hessian.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Check the 1PL closed forms.
    //
    // Given
    // -----
    // - b = 0.7, θ = 0.2, a correct response.
    //
    // Expect
    // ------
    // - p = σ(-0.5); ∂L/∂b = -(1 − p); ∂²L/∂b² = -p(1 − p); I = p(1 − p).
    fn rasch_closed_forms() {
        let ip = ItemParams::rasch(0.7);
        let p = 1.0 / (1.0 + 0.5_f64.exp());

        let jac = Rasch.jacobian(0.2, &ip, 1.0);
        let hess = Rasch.hessian(0.2, &ip, 1.0);

        assert_relative_eq!(Rasch.probability(0.2, &ip), p, epsilon = 1e-12);
        assert_eq!(jac.len(), 1);
        assert_relative_eq!(jac[0], -(1.0 - p), epsilon = 1e-12);
        assert_relative_eq!(hess[[0, 0]], -p * (1.0 - p), epsilon = 1e-12);
        assert_relative_eq!(Rasch.item_information(0.2, &ip), p * (1.0 - p), epsilon = 1e-12);
    }
}
