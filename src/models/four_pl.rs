//! Four-parameter logistic model: `p = c + (d − c)·σ(a(θ − b))`.
use crate::models::{
    params::{DIFFICULTY, DISCRIMINATION, GUESSING, ItemParams, UPPER},
    three_pl::INITIAL_GUESSING,
    traits::{ModelKind, ResponseModel},
};

/// Upper asymptote calibration starts from.
pub const INITIAL_UPPER: f64 = 0.95;

#[derive(Debug, Clone, Copy, Default)]
pub struct FourPl;

impl ResponseModel for FourPl {
    fn kind(&self) -> ModelKind {
        ModelKind::FourPLogistic
    }

    fn parameter_names(&self) -> &'static [&'static str] {
        &[DIFFICULTY, DISCRIMINATION, GUESSING, UPPER]
    }

    fn initial_params(&self) -> ItemParams {
        ItemParams { guessing: INITIAL_GUESSING, upper: INITIAL_UPPER, ..ItemParams::default() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover the upper asymptote ("slipping") and the shape of
    // the four-parameter jacobian.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Strong examinees still miss with probability 1 − d.
    //
    // Given
    // -----
    // - b = 0, a = 1, c = 0.2, d = 0.9.
    //
    // Expect
    // ------
    // - p(30) ≈ 0.9, p(0) = 0.55, a 4-entry jacobian and 4×4 hessian.
    fn upper_asymptote_caps_probability() {
        let ip = ItemParams { difficulty: 0.0, discrimination: 1.0, guessing: 0.2, upper: 0.9 };

        assert_relative_eq!(FourPl.probability(30.0, &ip), 0.9, epsilon = 1e-12);
        assert_relative_eq!(FourPl.probability(0.0, &ip), 0.55, epsilon = 1e-12);
        assert_eq!(FourPl.jacobian(0.0, &ip, 1.0).len(), 4);
        assert_eq!(FourPl.hessian(0.0, &ip, 1.0).dim(), (4, 4));
    }
}
