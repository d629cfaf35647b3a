//! Item parameter calibration with fixed person abilities.
//!
//! The Newton solver runs first on the chosen objective. For the
//! log-likelihood objective an unconverged Newton run is retried with the
//! L-BFGS maximizer, started from the Newton iterate, and the better of
//! the two is reported.
use ndarray::{Array1, Array2};
use std::collections::HashMap;

use crate::{
    codec::ParamTree,
    estimation::{
        errors::{EstimatorError, EstimatorResult},
        options::{CalibrationOptions, ItemBounds, ItemObjective},
        types::{CalibrationResponse, EstimateStatus, ItemEstimate, ResponseRecord, is_sentinel},
    },
    models::{ItemParams, ModelKind, ModelResult, ResponseModel, traits::check_fractions},
    optimization::{
        errors::{OptError, OptResult},
        loglik_optimizer::{Cost, Hessian, LogLikelihood, Theta, maximize},
        newton::{ScoreFunction, solve},
    },
};

/// Penalty weight for leaving the box in the unconstrained fallback.
const BOX_PENALTY: f64 = 1e4;

/// Objective of one item's free parameters over pooled responses.
pub struct ItemScore<'a> {
    model: &'static dyn ResponseModel,
    responses: &'a [CalibrationResponse],
    objective: ItemObjective,
    bounds: ItemBounds,
    thetas: Vec<f64>,
    fractions: Vec<f64>,
    weights: Vec<f64>,
}

impl<'a> ItemScore<'a> {
    /// # Errors
    /// - [`EstimatorError::NoResponses`] for an empty slice.
    /// - [`EstimatorError::InvalidWeight`] for a non-positive or non-finite weight.
    /// - [`EstimatorError::Model`] for a fraction outside `[0, 1]`.
    pub fn new(
        model: &'static dyn ResponseModel, responses: &'a [CalibrationResponse],
        objective: ItemObjective, bounds: ItemBounds,
    ) -> EstimatorResult<Self> {
        check_responses(responses)?;
        Ok(Self {
            model,
            responses,
            objective,
            bounds,
            thetas: responses.iter().map(|r| r.ability).collect(),
            fractions: responses.iter().map(|r| r.fraction).collect(),
            weights: responses.iter().map(|r| r.weight).collect(),
        })
    }

    /// Weighted log-likelihood `Σ n·L`.
    pub fn log_likelihood(&self, ip: &ItemParams) -> f64 {
        self.responses
            .iter()
            .map(|r| r.weight * self.model.log_likelihood(r.ability, ip, r.fraction))
            .sum()
    }

    /// Total weight, used as the sample size of information criteria.
    pub fn observations(&self) -> usize {
        self.weights.iter().sum::<f64>().round().max(1.0) as usize
    }

    fn params(&self, point: &ParamTree) -> OptResult<ItemParams> {
        let mut ip = ItemParams::default();
        for (index, &name) in self.model.parameter_names().iter().enumerate() {
            let value = point.number(name).ok_or_else(|| OptError::ObjectiveFailed {
                reason: format!("point has no '{name}' leaf"),
            })?;
            ip.set(index, value);
        }
        Ok(ip)
    }

    fn tree(&self, values: &Array1<f64>) -> ParamTree {
        ParamTree::map(self.model.parameter_names().iter().copied().zip(values.iter().copied()))
    }
}

fn objective<T>(result: ModelResult<T>) -> OptResult<T> {
    result.map_err(|err| OptError::ObjectiveFailed { reason: err.to_string() })
}

impl ScoreFunction for ItemScore<'_> {
    fn gradient(&self, point: &ParamTree) -> OptResult<ParamTree> {
        let ip = self.params(point)?;
        let grad = match self.objective {
            ItemObjective::LogLikelihood => {
                let mut total = Array1::zeros(self.model.free_parameters());
                for r in self.responses {
                    total.scaled_add(r.weight, &self.model.jacobian(r.ability, &ip, r.fraction));
                }
                total
            }
            ItemObjective::LeastMeanSquares => -objective(self.model.lms_first_derivative(
                &self.thetas,
                &ip,
                &self.fractions,
                &self.weights,
            ))?,
        };
        Ok(self.tree(&grad))
    }

    fn hessian(&self, point: &ParamTree) -> OptResult<Hessian> {
        let ip = self.params(point)?;
        match self.objective {
            ItemObjective::LogLikelihood => {
                let dim = self.model.free_parameters();
                let mut total = Array2::zeros((dim, dim));
                for r in self.responses {
                    total.scaled_add(r.weight, &self.model.hessian(r.ability, &ip, r.fraction));
                }
                Ok(total)
            }
            ItemObjective::LeastMeanSquares => Ok(-objective(self.model.lms_second_derivative(
                &self.thetas,
                &ip,
                &self.fractions,
                &self.weights,
            ))?),
        }
    }

    fn value(&self, point: &ParamTree) -> Option<OptResult<f64>> {
        let ip = match self.params(point) {
            Ok(ip) => ip,
            Err(err) => return Some(Err(err)),
        };
        Some(match self.objective {
            ItemObjective::LogLikelihood => Ok(self.log_likelihood(&ip)),
            ItemObjective::LeastMeanSquares => {
                objective(self.model.lms_value(&self.thetas, &ip, &self.fractions, &self.weights))
                    .map(|q| -q)
            }
        })
    }

    fn trusted_region(&self, point: ParamTree) -> ParamTree {
        match self.params(&point) {
            Ok(ip) => self.model.param_tree(&self.bounds.clamp(&ip)),
            Err(_) => point,
        }
    }
}

/// Unconstrained log-likelihood for the L-BFGS fallback.
///
/// Evaluates at the box-clamped point and subtracts a quadratic penalty for
/// the distance outside the box, so the maximizer is pulled back inside.
struct PenalizedItemLikelihood {
    model: &'static dyn ResponseModel,
    bounds: ItemBounds,
}

impl PenalizedItemLikelihood {
    fn split(&self, theta: &Theta) -> (ItemParams, f64) {
        let mut raw = ItemParams::default();
        for (index, value) in theta.iter().enumerate() {
            raw.set(index, *value);
        }
        let clamped = self.bounds.clamp(&raw);
        let distance = theta
            .iter()
            .enumerate()
            .map(|(index, value)| (value - clamped.get(index)).powi(2))
            .sum::<f64>();
        (clamped, distance)
    }
}

impl LogLikelihood for PenalizedItemLikelihood {
    type Data = Vec<CalibrationResponse>;

    fn value(&self, theta: &Theta, data: &Self::Data) -> OptResult<Cost> {
        let (ip, distance) = self.split(theta);
        let ll = data
            .iter()
            .map(|r| r.weight * self.model.log_likelihood(r.ability, &ip, r.fraction))
            .sum::<f64>();
        Ok(ll - BOX_PENALTY * distance)
    }

    fn check(&self, theta: &Theta, _data: &Self::Data) -> OptResult<()> {
        let expected = self.model.free_parameters();
        if theta.len() != expected {
            return Err(OptError::GradientDimMismatch { expected, found: theta.len() });
        }
        match theta.iter().position(|v| !v.is_finite()) {
            Some(index) => Err(OptError::InvalidThetaHat {
                index,
                value: theta[index],
                reason: "Starting parameters must be finite.",
            }),
            None => Ok(()),
        }
    }
}

/// Calibrate one item from pooled responses.
///
/// Parameters
/// ----------
/// - `responses`: `(ability, fraction, weight)` triples for this item.
/// - `model`: response model to fit.
/// - `initial`: optional starting parameter map (e.g. the stored values);
///   the model's default start is used otherwise.
/// - `opts`: objective, parameter box, Newton and fallback settings.
///
/// Returns
/// -------
/// `ItemEstimate` with the fitted parameters, weighted log-likelihood and
/// information criteria. `status` is `Converged` or `Unconverged`.
///
/// Errors
/// ------
/// - Input validation errors of [`ItemScore::new`].
/// - [`EstimatorError::Model`] when `initial` does not parse.
/// - [`EstimatorError::Optimization`] for numerical faults in the Newton solver.
pub fn calibrate_item(
    responses: &[CalibrationResponse], model: ModelKind, initial: Option<&ParamTree>,
    opts: &CalibrationOptions,
) -> EstimatorResult<ItemEstimate> {
    let response_model = model.model();
    let score = ItemScore::new(response_model, responses, opts.objective, opts.bounds)?;
    let start = match initial {
        Some(tree) => response_model.item_params(tree)?,
        None => response_model.initial_params(),
    };
    let start = response_model.param_tree(&opts.bounds.clamp(&start));

    let outcome = solve(&score, &start, &opts.newton)?;
    let mut ip = opts.bounds.clamp(&response_model.item_params(&outcome.estimate)?);
    let mut converged = outcome.converged;
    let mut iterations = outcome.iterations;
    let mut used_fallback = false;

    if let (false, ItemObjective::LogLikelihood, Some(mle)) =
        (converged, opts.objective, opts.fallback.as_ref())
    {
        let problem = PenalizedItemLikelihood { model: response_model, bounds: opts.bounds };
        let theta0 = Array1::from_iter((0..response_model.free_parameters()).map(|i| ip.get(i)));
        let data = responses.to_vec();
        // A failed line search leaves the Newton iterate in place.
        if let Ok(fallback) = maximize(&problem, theta0, &data, mle) {
            let (candidate, _) = problem.split(&fallback.theta_hat);
            if score.log_likelihood(&candidate) >= score.log_likelihood(&ip) {
                ip = candidate;
                converged = fallback.converged;
                iterations += fallback.iterations;
                used_fallback = true;
            }
        }
    }

    let log_likelihood = score.log_likelihood(&ip);
    let criteria = response_model.information_criteria(log_likelihood, score.observations())?;
    Ok(ItemEstimate {
        model,
        params: response_model.param_tree(&ip),
        item_params: ip,
        status: if converged { EstimateStatus::Converged } else { EstimateStatus::Unconverged },
        log_likelihood,
        criteria,
        iterations,
        used_fallback,
    })
}

/// Calibrate one item from raw responses and fixed person abilities.
///
/// Responses of persons whose stored ability is a boundary sentinel carry
/// no location information and are skipped.
///
/// # Errors
/// - [`EstimatorError::MissingAbility`] for a person absent from `abilities`.
/// - Errors of [`calibrate_item`].
pub fn estimate_item_params(
    responses: &[ResponseRecord], abilities: &HashMap<u64, f64>, model: ModelKind,
    initial: Option<&ParamTree>, opts: &CalibrationOptions,
) -> EstimatorResult<ItemEstimate> {
    let mut pooled = Vec::with_capacity(responses.len());
    for response in responses {
        let ability = *abilities
            .get(&response.person_id)
            .ok_or(EstimatorError::MissingAbility { person_id: response.person_id })?;
        if is_sentinel(ability) {
            continue;
        }
        pooled.push(CalibrationResponse::new(ability, response.fraction, 1.0));
    }
    calibrate_item(&pool_by_ability(&pooled), model, initial, opts)
}

/// Merge responses with identical abilities into one weighted response
/// carrying the weighted mean fraction. Order of first appearance is kept.
pub fn pool_by_ability(responses: &[CalibrationResponse]) -> Vec<CalibrationResponse> {
    let mut pooled: Vec<CalibrationResponse> = Vec::new();
    for r in responses {
        match pooled.iter_mut().find(|p| p.ability == r.ability) {
            Some(p) => {
                let weight = p.weight + r.weight;
                p.fraction = (p.fraction * p.weight + r.fraction * r.weight) / weight;
                p.weight = weight;
            }
            None => pooled.push(*r),
        }
    }
    pooled
}

fn check_responses(responses: &[CalibrationResponse]) -> EstimatorResult<()> {
    if responses.is_empty() {
        return Err(EstimatorError::NoResponses);
    }
    if let Some(index) = responses.iter().position(|r| !(r.weight.is_finite() && r.weight > 0.0)) {
        return Err(EstimatorError::InvalidWeight { index, value: responses[index].weight });
    }
    let fractions: Vec<f64> = responses.iter().map(|r| r.fraction).collect();
    check_fractions(&fractions)?;
    Ok(())
}
