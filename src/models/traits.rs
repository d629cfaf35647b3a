//! The response-model trait and the model registry.
use ndarray::{Array1, Array2};
use std::str::FromStr;

use crate::{
    codec::ParamTree,
    models::{
        birnbaum::Birnbaum,
        criteria::InformationCriteria,
        errors::{ModelError, ModelResult},
        four_pl::FourPl,
        kernel::{Logistic, leading, leading_block},
        params::{ItemParams, PARAMETER_ORDER},
        rasch::Rasch,
        three_pl::ThreePl,
    },
};

/// A dichotomous / partial-credit logistic response model.
///
/// Every model shares the four-parameter kernel and frees a prefix of the
/// canonical order `[difficulty, discrimination, guessing, upper]`; fixed
/// parameters keep the [`ItemParams::default`] values. Implementors only
/// name themselves and their free parameters; every quantity below has a
/// closed-form default.
///
/// Per-response methods take the ability `θ`, the item parameters and the
/// observed fraction `k ∈ [0, 1]`. Vectors and matrices over parameters are
/// in free-parameter order.
pub trait ResponseModel: Send + Sync {
    fn kind(&self) -> ModelKind;

    /// Names of the free parameters, a prefix of [`PARAMETER_ORDER`].
    fn parameter_names(&self) -> &'static [&'static str];

    fn free_parameters(&self) -> usize {
        self.parameter_names().len()
    }

    /// Starting point for item calibration.
    fn initial_params(&self) -> ItemParams {
        ItemParams::default()
    }

    /// Read the free parameters from a parameter map.
    ///
    /// # Errors
    /// - [`ModelError::MissingParameter`] when a free parameter is absent.
    /// - Errors of [`ItemParams::validate`].
    fn item_params(&self, tree: &ParamTree) -> ModelResult<ItemParams> {
        let mut ip = ItemParams::default();
        for (index, &name) in self.parameter_names().iter().enumerate() {
            let value = tree.number(name).ok_or(ModelError::MissingParameter { name })?;
            ip.set(index, value);
        }
        ip.validate()?;
        Ok(ip)
    }

    /// Free parameters as a flat map in canonical order.
    fn param_tree(&self, ip: &ItemParams) -> ParamTree {
        ParamTree::map(self.parameter_names().iter().enumerate().map(|(i, name)| (*name, ip.get(i))))
    }

    fn probability(&self, theta: f64, ip: &ItemParams) -> f64 {
        Logistic::at(theta, ip).p
    }

    fn log_likelihood(&self, theta: f64, ip: &ItemParams, k: f64) -> f64 {
        Logistic::at(theta, ip).log_likelihood(k)
    }

    /// `∂L/∂θ`.
    fn log_likelihood_first_derivative(&self, theta: f64, ip: &ItemParams, k: f64) -> f64 {
        Logistic::at(theta, ip).dtheta(k)
    }

    /// `∂²L/∂θ²`.
    fn log_likelihood_second_derivative(&self, theta: f64, ip: &ItemParams, k: f64) -> f64 {
        Logistic::at(theta, ip).d2theta(k)
    }

    /// `∂L/∂φ` over the free parameters.
    fn jacobian(&self, theta: f64, ip: &ItemParams, k: f64) -> Array1<f64> {
        leading(Logistic::at(theta, ip).dl(k), self.free_parameters())
    }

    /// `∂²L/∂φ∂φᵀ` over the free parameters.
    fn hessian(&self, theta: f64, ip: &ItemParams, k: f64) -> Array2<f64> {
        leading_block(Logistic::at(theta, ip).d2l(k), self.free_parameters())
    }

    /// Fisher information of one item at `θ`.
    fn item_information(&self, theta: f64, ip: &ItemParams) -> f64 {
        Logistic::at(theta, ip).information()
    }

    /// Weighted least-squares loss `Σ nᵢ (kᵢ − p(θᵢ))²`.
    ///
    /// # Errors
    /// Propagates length and fraction validation of [`check_pooled`].
    fn lms_value(&self, thetas: &[f64], ip: &ItemParams, ks: &[f64], ns: &[f64]) -> ModelResult<f64> {
        check_pooled(thetas, ks, ns)?;
        Ok(thetas
            .iter()
            .zip(ks)
            .zip(ns)
            .map(|((&theta, &k), &n)| n * (k - Logistic::at(theta, ip).p).powi(2))
            .sum())
    }

    /// `∂Q/∂φ = −2 Σ nᵢ (kᵢ − pᵢ) ∂pᵢ/∂φ` over the free parameters.
    ///
    /// # Errors
    /// Propagates length and fraction validation of [`check_pooled`].
    fn lms_first_derivative(
        &self, thetas: &[f64], ip: &ItemParams, ks: &[f64], ns: &[f64],
    ) -> ModelResult<Array1<f64>> {
        check_pooled(thetas, ks, ns)?;
        let dim = self.free_parameters();
        let mut total = Array1::zeros(dim);
        for ((&theta, &k), &n) in thetas.iter().zip(ks).zip(ns) {
            let at = Logistic::at(theta, ip);
            total.scaled_add(-2.0 * n * (k - at.p), &leading(at.dp(), dim));
        }
        Ok(total)
    }

    /// `∂²Q/∂φ∂φᵀ = 2 Σ nᵢ (∂pᵢ ∂pᵢᵀ − (kᵢ − pᵢ) ∂²pᵢ)` over the free
    /// parameters.
    ///
    /// # Errors
    /// Propagates length and fraction validation of [`check_pooled`].
    fn lms_second_derivative(
        &self, thetas: &[f64], ip: &ItemParams, ks: &[f64], ns: &[f64],
    ) -> ModelResult<Array2<f64>> {
        check_pooled(thetas, ks, ns)?;
        let dim = self.free_parameters();
        let mut total = Array2::zeros((dim, dim));
        for ((&theta, &k), &n) in thetas.iter().zip(ks).zip(ns) {
            let at = Logistic::at(theta, ip);
            let dp = at.dp();
            let d2p = at.d2p();
            let residual = k - at.p;
            for i in 0..dim {
                for j in 0..dim {
                    total[[i, j]] += 2.0 * n * (dp[i] * dp[j] - residual * d2p[i][j]);
                }
            }
        }
        Ok(total)
    }

    /// Information criteria of a fit with log-likelihood `log_likelihood`
    /// over `n` responses.
    ///
    /// # Errors
    /// [`ModelError::NoResponses`] when `n == 0`.
    fn information_criteria(&self, log_likelihood: f64, n: usize) -> ModelResult<InformationCriteria> {
        InformationCriteria::compute(log_likelihood, self.free_parameters(), n)
    }
}

/// Check pooled response slices: equal lengths and `k ∈ [0, 1]`.
///
/// # Errors
/// - [`ModelError::LengthMismatch`] when `ks` or `ns` differ in length from `thetas`.
/// - [`ModelError::InvalidFraction`] for a fraction outside `[0, 1]`.
pub fn check_pooled(thetas: &[f64], ks: &[f64], ns: &[f64]) -> ModelResult<()> {
    for other in [ks.len(), ns.len()] {
        if other != thetas.len() {
            return Err(ModelError::LengthMismatch { expected: thetas.len(), found: other });
        }
    }
    check_fractions(ks)
}

/// # Errors
/// [`ModelError::InvalidFraction`] for a fraction outside `[0, 1]` or NaN.
pub fn check_fractions(ks: &[f64]) -> ModelResult<()> {
    match ks.iter().position(|k| !(0.0..=1.0).contains(k)) {
        Some(index) => Err(ModelError::InvalidFraction { index, value: ks[index] }),
        None => Ok(()),
    }
}

/// Known response models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelKind {
    Rasch,
    RaschBirnbaum,
    MixedRaschBirnbaum,
    FourPLogistic,
}

static RASCH: Rasch = Rasch;
static BIRNBAUM: Birnbaum = Birnbaum;
static THREE_PL: ThreePl = ThreePl;
static FOUR_PL: FourPl = FourPl;

impl ModelKind {
    pub const ALL: [ModelKind; 4] = [
        ModelKind::Rasch,
        ModelKind::RaschBirnbaum,
        ModelKind::MixedRaschBirnbaum,
        ModelKind::FourPLogistic,
    ];

    pub fn model(&self) -> &'static dyn ResponseModel {
        match self {
            ModelKind::Rasch => &RASCH,
            ModelKind::RaschBirnbaum => &BIRNBAUM,
            ModelKind::MixedRaschBirnbaum => &THREE_PL,
            ModelKind::FourPLogistic => &FOUR_PL,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ModelKind::Rasch => "rasch",
            ModelKind::RaschBirnbaum => "raschbirnbaum",
            ModelKind::MixedRaschBirnbaum => "mixedraschbirnbaum",
            ModelKind::FourPLogistic => "fourplogistic",
        }
    }
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModelKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rasch" | "1pl" => Ok(ModelKind::Rasch),
            "raschbirnbaum" | "2pl" => Ok(ModelKind::RaschBirnbaum),
            "mixedraschbirnbaum" | "3pl" => Ok(ModelKind::MixedRaschBirnbaum),
            "fourplogistic" | "4pl" => Ok(ModelKind::FourPLogistic),
            _ => Err(ModelError::UnknownModel { name: s.to_string() }),
        }
    }
}
