//! Inputs and outputs of ability estimation and item calibration.
use crate::{
    codec::ParamTree,
    models::{InformationCriteria, ItemParams, ModelKind},
};

/// Stored magnitude marking a boundary ability. Never a real estimate.
pub const ABILITY_SENTINEL: f64 = 1_000.0;

/// `true` for values that carry the boundary sentinel (either sign).
pub fn is_sentinel(ability: f64) -> bool {
    ability.abs() >= ABILITY_SENTINEL
}

/// One answered question.
///
/// `fraction` is 1.0 for fully correct, 0.0 for fully incorrect, and in
/// between for partial credit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResponseRecord {
    pub person_id: u64,
    pub item_id: u64,
    pub fraction: f64,
}

impl ResponseRecord {
    pub fn new(person_id: u64, item_id: u64, fraction: f64) -> Self {
        Self { person_id, item_id, fraction }
    }
}

/// One (possibly pooled) response used for item calibration.
///
/// `weight` is the number of persons sharing `ability`; `fraction` is their
/// mean observed fraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationResponse {
    pub ability: f64,
    pub fraction: f64,
    pub weight: f64,
}

impl CalibrationResponse {
    pub fn new(ability: f64, fraction: f64, weight: f64) -> Self {
        Self { ability, fraction, weight }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundarySide {
    Lower,
    Upper,
}

/// Confidence signal attached to every estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EstimateStatus {
    /// Interior optimum found within tolerance.
    Converged,
    /// Iteration budget exhausted; the last iterate is reported.
    Unconverged,
    /// Likelihood is monotone or the optimum sits on an ability bound.
    Boundary(BoundarySide),
}

impl EstimateStatus {
    pub fn is_reliable(&self) -> bool {
        matches!(self, EstimateStatus::Converged)
    }
}

/// Ability estimate of one person on one scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbilityEstimate {
    pub ability: f64,
    pub status: EstimateStatus,
    /// `1/√I(θ̂)`, `+∞` without information.
    pub standard_error: f64,
    pub iterations: usize,
    /// Responses that contributed (excluded items are skipped).
    pub responses_used: usize,
}

impl AbilityEstimate {
    /// Callers must check this before treating `ability` as a measurement.
    pub fn is_reliable(&self) -> bool {
        self.status.is_reliable()
    }
}

/// Stored ability of a (person, scale, context) triple.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PersonParameter {
    pub person_id: u64,
    pub scale_id: u64,
    pub context_id: u64,
    /// `±ABILITY_SENTINEL` for boundary estimates.
    pub ability: f64,
    pub standard_error: f64,
    pub status: EstimateStatus,
}

impl PersonParameter {
    /// Storable record for `estimate`; boundary estimates become sentinels.
    pub fn from_estimate(
        person_id: u64, scale_id: u64, context_id: u64, estimate: &AbilityEstimate,
    ) -> Self {
        let ability = match estimate.status {
            EstimateStatus::Boundary(BoundarySide::Lower) => -ABILITY_SENTINEL,
            EstimateStatus::Boundary(BoundarySide::Upper) => ABILITY_SENTINEL,
            _ => estimate.ability,
        };
        Self {
            person_id,
            scale_id,
            context_id,
            ability,
            standard_error: estimate.standard_error,
            status: estimate.status,
        }
    }

    /// Stored ability, or `default` when it is a boundary sentinel or not finite.
    pub fn ability_or(&self, default: f64) -> f64 {
        if is_sentinel(self.ability) || !self.ability.is_finite() {
            default
        } else {
            self.ability
        }
    }
}

/// Result of calibrating one item.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemEstimate {
    pub model: ModelKind,
    /// Free parameters as stored in an `ItemParameter`.
    pub params: ParamTree,
    pub item_params: ItemParams,
    pub status: EstimateStatus,
    /// `Σ n·L` at the estimate.
    pub log_likelihood: f64,
    pub criteria: InformationCriteria,
    pub iterations: usize,
    /// The L-BFGS fallback produced the reported estimate.
    pub used_fallback: bool,
}
