//! Birnbaum (two-parameter logistic) model: `p = σ(a(θ − b))`.
use crate::models::{
    params::{DIFFICULTY, DISCRIMINATION},
    traits::{ModelKind, ResponseModel},
};

#[derive(Debug, Clone, Copy, Default)]
pub struct Birnbaum;

impl ResponseModel for Birnbaum {
    fn kind(&self) -> ModelKind {
        ModelKind::RaschBirnbaum
    }

    fn parameter_names(&self) -> &'static [&'static str] {
        &[DIFFICULTY, DISCRIMINATION]
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
    // These tests cover the sign behavior of the ability score for a correct
    // response and the 2PL parameter jacobian.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // A correct answer pulls the ability up, less so the higher it already is.
    //
    // Given
    // -----
    // - b = 1, a = 1.5, k = 1 and θ on a grid below and above b.
    //
    // Expect
    // ------
    // - ∂L/∂θ > 0 everywhere, strictly decreasing, and < 1e-3 at θ = 6.
    fn correct_answer_score_is_positive_and_fades() {
        let ip = ItemParams::two_pl(1.0, 1.5);
        let grid = [-3.0, -1.0, 0.0, 0.9, 2.0, 6.0];

        let scores: Vec<f64> =
            grid.iter().map(|&t| Birnbaum.log_likelihood_first_derivative(t, &ip, 1.0)).collect();

        assert!(scores.iter().all(|&s| s > 0.0));
        assert!(scores.windows(2).all(|w| w[1] < w[0]));
        assert!(scores[5] < 1e-3);
    }

    #[test]
    // Purpose
    // -------
    // Check the 2PL jacobian in closed form.
    //
    // Given
    // -----
    // - b = -0.2, a = 2, θ = 0.3, k = 0.
    //
    // Expect
    // ------
    // - ∂L/∂b = a p, ∂L/∂a = -(θ − b) p.
    fn jacobian_closed_form() {
        let ip = ItemParams::two_pl(-0.2, 2.0);
        let p = Birnbaum.probability(0.3, &ip);

        let jac = Birnbaum.jacobian(0.3, &ip, 0.0);

        assert_relative_eq!(jac[0], 2.0 * p, epsilon = 1e-12);
        assert_relative_eq!(jac[1], -0.5 * p, epsilon = 1e-12);
    }
}
