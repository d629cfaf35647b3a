//! Person ability estimation with fixed item parameters.
use ndarray::Array2;
use std::collections::HashMap;

use crate::{
    codec::ParamTree,
    estimation::{
        errors::{EstimatorError, EstimatorResult},
        options::{AbilityPrior, EstimatorOptions},
        types::{AbilityEstimate, BoundarySide, EstimateStatus, ResponseRecord},
    },
    models::{ItemParameter, ItemParams, ResponseModel, traits::check_fractions},
    optimization::{
        errors::{OptError, OptResult},
        loglik_optimizer::Hessian,
        newton::{ScoreFunction, solve},
    },
    statistics::standard_error_from_information,
};

/// Key of the single leaf of an ability point.
pub const ABILITY: &str = "ability";

/// Distance to a bound below which an estimate counts as on the bound.
const BOUND_TOL: f64 = 1e-6;

/// Test information below which a stationary point is a plateau, not a
/// measurement (SE above 1000).
const MIN_INFORMATION: f64 = 1e-6;

/// One response as seen by the ability score: model, item, fraction.
#[derive(Clone, Copy)]
pub struct AbilityTerm {
    pub model: &'static dyn ResponseModel,
    pub ip: ItemParams,
    pub fraction: f64,
}

impl std::fmt::Debug for AbilityTerm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AbilityTerm")
            .field("model", &self.model.kind())
            .field("ip", &self.ip)
            .field("fraction", &self.fraction)
            .finish()
    }
}

/// Log-likelihood (or log-posterior) of one person's ability.
///
/// Sums the model's ability derivatives across responses, adds the prior
/// when present, and clamps iterates to the ability bounds.
#[derive(Debug, Clone)]
pub struct AbilityScore {
    terms: Vec<AbilityTerm>,
    prior: Option<AbilityPrior>,
    lower: f64,
    upper: f64,
}

impl AbilityScore {
    /// # Errors
    /// - [`EstimatorError::NoResponses`] for an empty term list.
    /// - [`EstimatorError::Model`] for a fraction outside `[0, 1]`.
    pub fn new(terms: Vec<AbilityTerm>, opts: &EstimatorOptions) -> EstimatorResult<Self> {
        if terms.is_empty() {
            return Err(EstimatorError::NoResponses);
        }
        let fractions: Vec<f64> = terms.iter().map(|t| t.fraction).collect();
        check_fractions(&fractions)?;
        Ok(Self { terms, prior: opts.prior, lower: opts.lower_bound, upper: opts.upper_bound })
    }

    /// Terms for `responses`, looking up each item in `items`.
    ///
    /// Responses to items whose status is not usable (not calculated or
    /// excluded) are skipped.
    ///
    /// # Errors
    /// - [`EstimatorError::UnknownItem`] for an item missing from `items`.
    /// - [`EstimatorError::Model`] when stored parameters do not parse.
    /// - Errors of [`AbilityScore::new`].
    pub fn from_responses(
        responses: &[ResponseRecord], items: &HashMap<u64, ItemParameter>, opts: &EstimatorOptions,
    ) -> EstimatorResult<Self> {
        let mut terms = Vec::with_capacity(responses.len());
        for response in responses {
            let item = items
                .get(&response.item_id)
                .ok_or(EstimatorError::UnknownItem { item_id: response.item_id })?;
            if !item.status.is_usable() {
                continue;
            }
            terms.push(AbilityTerm {
                model: item.model.model(),
                ip: item.item_params()?,
                fraction: response.fraction,
            });
        }
        Self::new(terms, opts)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn log_likelihood(&self, theta: f64) -> f64 {
        let prior = self.prior.map_or(0.0, |p| p.ln_density(theta));
        self.terms.iter().map(|t| t.model.log_likelihood(theta, &t.ip, t.fraction)).sum::<f64>() + prior
    }

    pub fn first_derivative(&self, theta: f64) -> f64 {
        let prior = self.prior.map_or(0.0, |p| p.score(theta));
        self.terms
            .iter()
            .map(|t| t.model.log_likelihood_first_derivative(theta, &t.ip, t.fraction))
            .sum::<f64>()
            + prior
    }

    pub fn second_derivative(&self, theta: f64) -> f64 {
        let prior = self.prior.map_or(0.0, |p| p.curvature());
        self.terms
            .iter()
            .map(|t| t.model.log_likelihood_second_derivative(theta, &t.ip, t.fraction))
            .sum::<f64>()
            + prior
    }

    /// Test information at `θ`, plus the prior precision for MAP.
    pub fn information(&self, theta: f64) -> f64 {
        let prior = self.prior.map_or(0.0, |p| -p.curvature());
        self.terms.iter().map(|t| t.model.item_information(theta, &t.ip)).sum::<f64>() + prior
    }

    /// Side of a degenerate pattern: every fraction within `eps` of 1 (upper)
    /// or of 0 (lower).
    pub fn degenerate_side(&self, eps: f64) -> Option<BoundarySide> {
        if self.terms.iter().all(|t| t.fraction >= 1.0 - eps) {
            Some(BoundarySide::Upper)
        } else if self.terms.iter().all(|t| t.fraction <= eps) {
            Some(BoundarySide::Lower)
        } else {
            None
        }
    }

    fn theta(point: &ParamTree) -> OptResult<f64> {
        point.number(ABILITY).ok_or_else(|| OptError::ObjectiveFailed {
            reason: format!("point has no '{ABILITY}' leaf"),
        })
    }
}

impl ScoreFunction for AbilityScore {
    fn gradient(&self, point: &ParamTree) -> OptResult<ParamTree> {
        let theta = Self::theta(point)?;
        Ok(ParamTree::map([(ABILITY, self.first_derivative(theta))]))
    }

    fn hessian(&self, point: &ParamTree) -> OptResult<Hessian> {
        let theta = Self::theta(point)?;
        Ok(Array2::from_elem((1, 1), self.second_derivative(theta)))
    }

    fn value(&self, point: &ParamTree) -> Option<OptResult<f64>> {
        Some(Self::theta(point).map(|theta| self.log_likelihood(theta)))
    }

    fn trusted_region(&self, mut point: ParamTree) -> ParamTree {
        if let Some(theta) = point.number(ABILITY) {
            point.set_number(ABILITY, theta.clamp(self.lower, self.upper));
        }
        point
    }
}

/// Estimate one person's ability from answered questions.
///
/// Parameters
/// ----------
/// - `responses`: `{item_id, fraction}` records of one person on one scale.
/// - `items`: stored item parameters keyed by item id.
/// - `opts`: bounds, start value, optional prior and solver settings.
///
/// Returns
/// -------
/// `AbilityEstimate` with a status callers must check before trusting the
/// value (see [`AbilityEstimate::is_reliable`]).
///
/// Errors
/// ------
/// - [`EstimatorError::NoResponses`] when no response refers to a usable item.
/// - [`EstimatorError::UnknownItem`] / [`EstimatorError::Model`] for bad inputs.
/// - [`EstimatorError::Optimization`] when the solver hits a numerical fault.
///
/// Notes
/// -----
/// - Without a prior, an all-correct (all-incorrect) pattern has a
///   monotone likelihood; it is reported as `Boundary(Upper)` (`Lower`) at
///   the corresponding bound without running the solver.
/// - A solver result sitting on a bound is reported as `Boundary` as well.
/// - A stationary point with (near) zero test information, e.g. a vanishing
///   score on a likelihood plateau, is reported as `Unconverged`.
pub fn estimate_person_ability(
    responses: &[ResponseRecord], items: &HashMap<u64, ItemParameter>, opts: &EstimatorOptions,
) -> EstimatorResult<AbilityEstimate> {
    let score = AbilityScore::from_responses(responses, items, opts)?;
    estimate_ability(&score, opts)
}

/// Run the estimate for an already assembled [`AbilityScore`].
///
/// # Errors
/// See [`estimate_person_ability`].
pub fn estimate_ability(
    score: &AbilityScore, opts: &EstimatorOptions,
) -> EstimatorResult<AbilityEstimate> {
    if score.prior.is_none() {
        if let Some(side) = score.degenerate_side(opts.degenerate_epsilon) {
            let ability = match side {
                BoundarySide::Lower => opts.lower_bound,
                BoundarySide::Upper => opts.upper_bound,
            };
            return Ok(AbilityEstimate {
                ability,
                status: EstimateStatus::Boundary(side),
                standard_error: standard_error_from_information(score.information(ability)),
                iterations: 0,
                responses_used: score.len(),
            });
        }
    }

    let initial = ParamTree::map([(ABILITY, opts.initial_ability)]);
    let outcome = solve(score, &initial, &opts.newton)?;
    let ability = AbilityScore::theta(&outcome.estimate)?;
    let information = score.information(ability);
    let status = if ability <= opts.lower_bound + BOUND_TOL {
        EstimateStatus::Boundary(BoundarySide::Lower)
    } else if ability >= opts.upper_bound - BOUND_TOL {
        EstimateStatus::Boundary(BoundarySide::Upper)
    } else if outcome.converged && information >= MIN_INFORMATION {
        EstimateStatus::Converged
    } else {
        EstimateStatus::Unconverged
    };

    Ok(AbilityEstimate {
        ability,
        status,
        standard_error: standard_error_from_information(information),
        iterations: outcome.iterations,
        responses_used: score.len(),
    })
}
