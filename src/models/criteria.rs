//! Information criteria for comparing fitted response models.
use std::str::FromStr;

use crate::models::{
    errors::{ModelError, ModelResult},
    traits::ModelKind,
};

/// Penalized fit statistics of one model fit. Smaller is better.
///
/// `aicc` is `None` when `n − p − 1 ≤ 0`; the small-sample correction is
/// not computable there and no finite stand-in is reported.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InformationCriteria {
    pub log_likelihood: f64,
    pub free_parameters: usize,
    pub observations: usize,
    pub aic: f64,
    pub bic: f64,
    pub caic: f64,
    pub aicc: Option<f64>,
    pub sabic: f64,
}

impl InformationCriteria {
    /// Compute every criterion for log-likelihood `log_likelihood`, `p` free
    /// parameters and `n` responses.
    ///
    /// # Errors
    /// [`ModelError::NoResponses`] when `n == 0` (`log n` is undefined).
    pub fn compute(log_likelihood: f64, p: usize, n: usize) -> ModelResult<Self> {
        if n == 0 {
            return Err(ModelError::NoResponses);
        }
        let (pf, nf) = (p as f64, n as f64);
        let deviance = -2.0 * log_likelihood;
        let aic = deviance + 2.0 * pf;
        let aicc = (n > p + 1).then(|| aic + 2.0 * pf * (pf + 1.0) / (nf - pf - 1.0));
        Ok(Self {
            log_likelihood,
            free_parameters: p,
            observations: n,
            aic,
            bic: deviance + pf * nf.ln(),
            caic: deviance + pf * (nf.ln() + 1.0),
            aicc,
            sabic: deviance + pf * ((nf + 2.0) / 24.0).ln(),
        })
    }

    pub fn get(&self, criterion: Criterion) -> Option<f64> {
        match criterion {
            Criterion::Aic => Some(self.aic),
            Criterion::Bic => Some(self.bic),
            Criterion::Caic => Some(self.caic),
            Criterion::Aicc => self.aicc,
            Criterion::Sabic => Some(self.sabic),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Criterion {
    #[default]
    Aic,
    Bic,
    Caic,
    Aicc,
    Sabic,
}

impl FromStr for Criterion {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "aic" => Ok(Criterion::Aic),
            "bic" => Ok(Criterion::Bic),
            "caic" => Ok(Criterion::Caic),
            "aicc" => Ok(Criterion::Aicc),
            "sabic" => Ok(Criterion::Sabic),
            _ => Err(ModelError::UnknownCriterion { name: s.to_string() }),
        }
    }
}

/// Candidate with the smallest value of `criterion`.
///
/// Candidates whose criterion is not computable (or not finite) are skipped;
/// `None` when no candidate remains. Ties keep the earlier candidate.
pub fn select_model(
    candidates: &[(ModelKind, InformationCriteria)], criterion: Criterion,
) -> Option<ModelKind> {
    candidates
        .iter()
        .filter_map(|(kind, ic)| ic.get(criterion).filter(|v| v.is_finite()).map(|v| (*kind, v)))
        .fold(None, |best: Option<(ModelKind, f64)>, (kind, v)| match best {
            Some((_, bv)) if bv <= v => best,
            _ => Some((kind, v)),
        })
        .map(|(kind, _)| kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover the criterion formulas, the undefined AICc case, and
    // model selection.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Check every formula at a hand-computed point.
    //
    // Given
    // -----
    // - L = -50, p = 2, n = 40.
    //
    // Expect
    // ------
    // - aic 104, bic 100 + 2 ln 40, caic bic + 2, aicc 104 + 12/37,
    //   sabic 100 + 2 ln(42/24).
    fn formulas_match_hand_computation() {
        let ic = InformationCriteria::compute(-50.0, 2, 40).expect("n > 0");

        assert_relative_eq!(ic.aic, 104.0);
        assert_relative_eq!(ic.bic, 100.0 + 2.0 * 40f64.ln(), epsilon = 1e-12);
        assert_relative_eq!(ic.caic, ic.bic + 2.0, epsilon = 1e-12);
        assert_relative_eq!(ic.aicc.expect("defined"), 104.0 + 12.0 / 37.0, epsilon = 1e-12);
        assert_relative_eq!(ic.sabic, 100.0 + 2.0 * (42.0f64 / 24.0).ln(), epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // AICc is reported as not computable when n − p − 1 ≤ 0, and n = 0 is
    // rejected.
    //
    // Given
    // -----
    // - p = 3 with n = 4 and n = 5; n = 0.
    //
    // Expect
    // ------
    // - aicc None at n = 4, Some at n = 5; NoResponses at n = 0.
    fn aicc_undefined_for_small_samples() {
        assert_eq!(InformationCriteria::compute(-3.0, 3, 4).expect("n > 0").aicc, None);
        assert!(InformationCriteria::compute(-3.0, 3, 5).expect("n > 0").aicc.is_some());
        assert_eq!(InformationCriteria::compute(-3.0, 3, 0), Err(ModelError::NoResponses));
    }

    #[test]
    // Purpose
    // -------
    // Selection picks the minimum and skips undefined values.
    //
    // Given
    // -----
    // - A 1PL fit with small n (AICc undefined) and a 2PL fit.
    //
    // Expect
    // ------
    // - By AIC the better-penalized fit wins; by AICc only the 2PL counts.
    fn select_model_prefers_smallest_defined_value() {
        let rasch = InformationCriteria::compute(-10.0, 1, 2).expect("n > 0");
        let two_pl = InformationCriteria::compute(-12.0, 2, 30).expect("n > 0");
        let candidates = [(ModelKind::Rasch, rasch), (ModelKind::RaschBirnbaum, two_pl)];

        assert_eq!(select_model(&candidates, Criterion::Aic), Some(ModelKind::Rasch));
        assert_eq!(select_model(&candidates, Criterion::Aicc), Some(ModelKind::RaschBirnbaum));
        assert_eq!(select_model(&[], Criterion::Bic), None);
    }

    #[test]
    // Purpose
    // -------
    // Criterion names parse case-insensitively; unknown names are typed errors.
    //
    // Given
    // -----
    // - " AICc ", "sabic" and "dic".
    //
    // Expect
    // ------
    // - Aicc, Sabic, and UnknownCriterion { "dic" }.
    fn criterion_names_parse() {
        assert_eq!(" AICc ".parse::<Criterion>(), Ok(Criterion::Aicc));
        assert_eq!("sabic".parse::<Criterion>(), Ok(Criterion::Sabic));
        assert_eq!(
            "dic".parse::<Criterion>(),
            Err(ModelError::UnknownCriterion { name: "dic".to_string() })
        );
    }
}
