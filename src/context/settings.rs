//! Per-test CAT settings carried in the seed context.
use crate::context::errors::{ContextError, ContextResult};

pub const DEFAULT_STANDARD_ERROR: f64 = 1.0;
pub const DEFAULT_SE_THRESHOLD: f64 = 0.3;
pub const DEFAULT_PILOT_ATTEMPTS: u32 = 30;

/// How the scales eligible for the next question are chosen.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ScaleStrategy {
    /// Only the tested (root) scale.
    #[default]
    ClassicalCat,
    /// The tested scale and every subscale below it.
    InferAllSubscales,
    /// A fixed selection; ids outside the tested tree are ignored.
    TeacherSelection { scales: Vec<u64> },
}

/// Settings consumed by the context loaders.
///
/// Defaults: ability 0.0, standard error 1.0 for scales without answered
/// questions, SE threshold 0.3, no per-scale question cap, 30 attempts
/// before a question leaves pilot status, [`ScaleStrategy::ClassicalCat`].
#[derive(Debug, Clone, PartialEq)]
pub struct CatSettings {
    pub default_ability: f64,
    pub default_standard_error: f64,
    /// A scale whose standard error falls below this is considered measured.
    pub se_threshold: f64,
    pub max_questions_per_scale: Option<usize>,
    pub pilot_attempts_threshold: u32,
    pub strategy: ScaleStrategy,
}

impl CatSettings {
    /// # Errors
    /// [`ContextError::InvalidSettings`] for a non-finite default ability, a
    /// non-positive standard error or threshold, or a question cap of 0.
    pub fn new(
        default_ability: f64, default_standard_error: f64, se_threshold: f64,
        max_questions_per_scale: Option<usize>, pilot_attempts_threshold: u32,
        strategy: ScaleStrategy,
    ) -> ContextResult<Self> {
        if !default_ability.is_finite() {
            return Err(ContextError::InvalidSettings {
                name: "default_ability",
                value: default_ability,
                reason: "Default ability must be finite.",
            });
        }
        if default_standard_error.is_nan() || default_standard_error <= 0.0 {
            return Err(ContextError::InvalidSettings {
                name: "default_standard_error",
                value: default_standard_error,
                reason: "Default standard error must be positive.",
            });
        }
        if !se_threshold.is_finite() || se_threshold <= 0.0 {
            return Err(ContextError::InvalidSettings {
                name: "se_threshold",
                value: se_threshold,
                reason: "Standard error threshold must be positive and finite.",
            });
        }
        if max_questions_per_scale == Some(0) {
            return Err(ContextError::InvalidSettings {
                name: "max_questions_per_scale",
                value: 0.0,
                reason: "Question cap must allow at least one question.",
            });
        }
        Ok(Self {
            default_ability,
            default_standard_error,
            se_threshold,
            max_questions_per_scale,
            pilot_attempts_threshold,
            strategy,
        })
    }

    pub fn with_strategy(mut self, strategy: ScaleStrategy) -> Self {
        self.strategy = strategy;
        self
    }
}

impl Default for CatSettings {
    fn default() -> Self {
        Self {
            default_ability: 0.0,
            default_standard_error: DEFAULT_STANDARD_ERROR,
            se_threshold: DEFAULT_SE_THRESHOLD,
            max_questions_per_scale: None,
            pilot_attempts_threshold: DEFAULT_PILOT_ATTEMPTS,
            strategy: ScaleStrategy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Reject settings the loaders cannot work with.
    //
    // Given
    // -----
    // - NaN ability, zero standard error, infinite threshold, cap 0.
    //
    // Expect
    // ------
    // - Each yields `InvalidSettings` naming the field; an infinite default
    //   standard error is accepted.
    fn settings_reject_unusable_values() {
        let strategy = ScaleStrategy::ClassicalCat;
        let name_of = |res: ContextResult<CatSettings>| match res {
            Err(ContextError::InvalidSettings { name, .. }) => name,
            other => panic!("Expected InvalidSettings, got {other:?}"),
        };

        assert_eq!(
            name_of(CatSettings::new(f64::NAN, 1.0, 0.3, None, 0, strategy.clone())),
            "default_ability"
        );
        assert_eq!(
            name_of(CatSettings::new(0.0, 0.0, 0.3, None, 0, strategy.clone())),
            "default_standard_error"
        );
        assert_eq!(
            name_of(CatSettings::new(0.0, 1.0, f64::INFINITY, None, 0, strategy.clone())),
            "se_threshold"
        );
        assert_eq!(
            name_of(CatSettings::new(0.0, 1.0, 0.3, Some(0), 0, strategy.clone())),
            "max_questions_per_scale"
        );
        assert!(CatSettings::new(0.0, f64::INFINITY, 0.3, Some(5), 0, strategy).is_ok());
    }
}
