//! Item parameter values and stored item parameter records.
use crate::{
    codec::ParamTree,
    models::{
        errors::{ModelError, ModelResult},
        traits::ModelKind,
    },
};

pub const DIFFICULTY: &str = "difficulty";
pub const DISCRIMINATION: &str = "discrimination";
pub const GUESSING: &str = "guessing";
pub const UPPER: &str = "upper";

/// Canonical parameter order. Every model's free parameters are a prefix.
pub const PARAMETER_ORDER: [&str; 4] = [DIFFICULTY, DISCRIMINATION, GUESSING, UPPER];

/// Full four-parameter logistic item description.
///
/// Models with fewer free parameters keep the others at their defaults
/// (`discrimination = 1`, `guessing = 0`, `upper = 1`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemParams {
    pub difficulty: f64,
    pub discrimination: f64,
    pub guessing: f64,
    pub upper: f64,
}

impl Default for ItemParams {
    fn default() -> Self {
        Self { difficulty: 0.0, discrimination: 1.0, guessing: 0.0, upper: 1.0 }
    }
}

impl ItemParams {
    pub fn rasch(difficulty: f64) -> Self {
        Self { difficulty, ..Self::default() }
    }

    pub fn two_pl(difficulty: f64, discrimination: f64) -> Self {
        Self { difficulty, discrimination, ..Self::default() }
    }

    pub fn three_pl(difficulty: f64, discrimination: f64, guessing: f64) -> Self {
        Self { difficulty, discrimination, guessing, ..Self::default() }
    }

    /// Value by canonical position (see [`PARAMETER_ORDER`]).
    pub fn get(&self, index: usize) -> f64 {
        match index {
            0 => self.difficulty,
            1 => self.discrimination,
            2 => self.guessing,
            _ => self.upper,
        }
    }

    pub fn set(&mut self, index: usize, value: f64) {
        match index {
            0 => self.difficulty = value,
            1 => self.discrimination = value,
            2 => self.guessing = value,
            _ => self.upper = value,
        }
    }

    /// Check finiteness and `0 ≤ guessing < upper ≤ 1`.
    ///
    /// # Errors
    /// - [`ModelError::NonFiniteParameter`] for NaN or infinite values.
    /// - [`ModelError::InvalidParameter`] when the asymptotes are out of
    ///   order or outside the unit interval.
    pub fn validate(&self) -> ModelResult<()> {
        for (index, &name) in PARAMETER_ORDER.iter().enumerate() {
            let value = self.get(index);
            if !value.is_finite() {
                return Err(ModelError::NonFiniteParameter { name, value });
            }
        }
        if !(0.0..1.0).contains(&self.guessing) {
            return Err(ModelError::InvalidParameter {
                name: GUESSING,
                value: self.guessing,
                reason: "Guessing must lie in [0, 1).",
            });
        }
        if self.upper > 1.0 || self.upper <= self.guessing {
            return Err(ModelError::InvalidParameter {
                name: UPPER,
                value: self.upper,
                reason: "Upper asymptote must lie in (guessing, 1].",
            });
        }
        Ok(())
    }
}

/// Calculation state of a stored item parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CalculationStatus {
    NotCalculated,
    Calculated,
    ManuallySet,
    ManuallyConfirmed,
    ManuallyExcluded,
}

impl CalculationStatus {
    /// Manually set or confirmed values are not overwritten by recalculation.
    pub fn is_locked(&self) -> bool {
        matches!(self, CalculationStatus::ManuallySet | CalculationStatus::ManuallyConfirmed)
    }

    /// Whether the item may contribute to ability estimation.
    pub fn is_usable(&self) -> bool {
        !matches!(self, CalculationStatus::NotCalculated | CalculationStatus::ManuallyExcluded)
    }
}

/// Item parameters of one question under one model in one context.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemParameter {
    pub component_id: u64,
    pub component_type: String,
    pub model: ModelKind,
    pub params: ParamTree,
    pub status: CalculationStatus,
    pub context_id: u64,
}

impl ItemParameter {
    pub fn new(
        component_id: u64, component_type: impl Into<String>, model: ModelKind, params: ParamTree,
        context_id: u64,
    ) -> Self {
        Self {
            component_id,
            component_type: component_type.into(),
            model,
            params,
            status: CalculationStatus::NotCalculated,
            context_id,
        }
    }

    /// Typed parameters under this record's model.
    ///
    /// # Errors
    /// Propagates missing or invalid parameters from the model.
    pub fn item_params(&self) -> ModelResult<ItemParams> {
        self.model.model().item_params(&self.params)
    }

    /// Copy of this record for a new context. The old record is kept as is.
    pub fn supersede(&self, context_id: u64) -> Self {
        Self { context_id, ..self.clone() }
    }

    /// Store a recalculated parameter tree unless the record is locked.
    ///
    /// Returns `false` when the record was left unchanged.
    pub fn update_calculated(&mut self, params: ParamTree) -> bool {
        if self.status.is_locked() || self.status == CalculationStatus::ManuallyExcluded {
            return false;
        }
        self.params = params;
        self.status = CalculationStatus::Calculated;
        true
    }

    pub fn exclude(&mut self) {
        self.status = CalculationStatus::ManuallyExcluded;
    }
}
