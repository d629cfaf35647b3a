//! context::value — the key→value map loaders read and extend.
//!
//! Purpose
//! -------
//! Give the pipeline a closed set of value shapes so that loaders can read
//! each other's outputs through typed getters instead of downcasting.
//!
//! Key behaviors
//! -------------
//! - [`Context`] keeps keys in sorted order; inserting an existing key
//!   overwrites it.
//! - Getters return [`ContextError::MissingKey`] or
//!   [`ContextError::TypeMismatch`] instead of panicking.
//!
//! Conventions
//! -----------
//! - Key names live in [`keys`]; seed keys come first.
//! - Per-scale numbers (abilities, standard errors) use
//!   [`ContextValue::Scalars`] keyed by scale id.
use std::collections::{BTreeMap, BTreeSet};

use crate::context::{
    errors::{ContextError, ContextResult},
    progress::Progress,
    repository::{Question, ScaleTree},
    settings::CatSettings,
};

pub mod keys {
    // Seed.
    pub const ATTEMPT_ID: &str = "attempt_id";
    pub const USER_ID: &str = "user_id";
    pub const COMPONENT_ID: &str = "component_id";
    pub const CONTEXT_ID: &str = "context_id";
    pub const SCALE_ID: &str = "scale_id";
    pub const SETTINGS: &str = "settings";

    // Loader outputs.
    pub const SCALES: &str = "scales";
    pub const PERSON_ABILITY: &str = "person_ability";
    pub const PROGRESS: &str = "progress";
    pub const IS_FIRST_QUESTION: &str = "is_first_question";
    pub const QUESTIONS: &str = "questions";
    pub const PILOT_QUESTIONS: &str = "pilot_questions";
    pub const STANDARD_ERRORS: &str = "standard_errors";
    pub const ACTIVE_SCALES: &str = "active_scales";

    pub const SEED: [&str; 6] = [ATTEMPT_ID, USER_ID, COMPONENT_ID, CONTEXT_ID, SCALE_ID, SETTINGS];
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContextValue {
    Id(u64),
    Ids(BTreeSet<u64>),
    Flag(bool),
    Scalars(BTreeMap<u64, f64>),
    Settings(CatSettings),
    Scales(ScaleTree),
    Progress(Progress),
    /// Questions per scale id.
    Questions(BTreeMap<u64, Vec<Question>>),
}

impl ContextValue {
    pub fn kind(&self) -> &'static str {
        match self {
            ContextValue::Id(_) => "id",
            ContextValue::Ids(_) => "ids",
            ContextValue::Flag(_) => "flag",
            ContextValue::Scalars(_) => "scalars",
            ContextValue::Settings(_) => "settings",
            ContextValue::Scales(_) => "scales",
            ContextValue::Progress(_) => "progress",
            ContextValue::Questions(_) => "questions",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Context {
    entries: BTreeMap<String, ContextValue>,
}

macro_rules! typed_getter {
    ($name:ident, $variant:ident, $ty:ty, $kind:literal) => {
        pub fn $name(&self, key: &str) -> ContextResult<&$ty> {
            match self.get(key)? {
                ContextValue::$variant(value) => Ok(value),
                other => Err(ContextError::TypeMismatch {
                    key: key.to_string(),
                    expected: $kind,
                    found: other.kind(),
                }),
            }
        }
    };
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed context for one question-selection step.
    pub fn seed(
        attempt_id: u64, user_id: u64, component_id: u64, context_id: u64, scale_id: u64,
        settings: CatSettings,
    ) -> Self {
        Self::new()
            .with(keys::ATTEMPT_ID, ContextValue::Id(attempt_id))
            .with(keys::USER_ID, ContextValue::Id(user_id))
            .with(keys::COMPONENT_ID, ContextValue::Id(component_id))
            .with(keys::CONTEXT_ID, ContextValue::Id(context_id))
            .with(keys::SCALE_ID, ContextValue::Id(scale_id))
            .with(keys::SETTINGS, ContextValue::Settings(settings))
    }

    pub fn with(mut self, key: &str, value: ContextValue) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: ContextValue) -> Option<ContextValue> {
        self.entries.insert(key.to_string(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<ContextValue> {
        self.entries.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn contains_all(&self, keys: &[&str]) -> bool {
        keys.iter().all(|key| self.contains(key))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries of `other` are added, replacing existing keys.
    pub fn merge(&mut self, other: Context) {
        self.entries.extend(other.entries);
    }

    pub fn get(&self, key: &str) -> ContextResult<&ContextValue> {
        self.entries.get(key).ok_or_else(|| ContextError::MissingKey { key: key.to_string() })
    }

    pub fn id(&self, key: &str) -> ContextResult<u64> {
        match self.get(key)? {
            ContextValue::Id(value) => Ok(*value),
            other => Err(ContextError::TypeMismatch {
                key: key.to_string(),
                expected: "id",
                found: other.kind(),
            }),
        }
    }

    pub fn flag(&self, key: &str) -> ContextResult<bool> {
        match self.get(key)? {
            ContextValue::Flag(value) => Ok(*value),
            other => Err(ContextError::TypeMismatch {
                key: key.to_string(),
                expected: "flag",
                found: other.kind(),
            }),
        }
    }

    typed_getter!(ids, Ids, BTreeSet<u64>, "ids");
    typed_getter!(scalars, Scalars, BTreeMap<u64, f64>, "scalars");
    typed_getter!(settings, Settings, CatSettings, "settings");
    typed_getter!(scales, Scales, ScaleTree, "scales");
    typed_getter!(progress, Progress, Progress, "progress");
    typed_getter!(questions, Questions, BTreeMap<u64, Vec<Question>>, "questions");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Typed getters distinguish absent keys from wrongly typed ones.
    //
    // Given
    // -----
    // - A seed context.
    //
    // Expect
    // ------
    // - Seed ids read back; `scales` is missing; reading `user_id` as
    //   settings is a type mismatch; merge overwrites.
    fn typed_getters_report_missing_and_mismatch() {
        let mut ctx = Context::seed(1, 2, 3, 4, 5, CatSettings::default());

        assert_eq!(ctx.id(keys::USER_ID), Ok(2));
        assert!(ctx.contains_all(&keys::SEED));
        assert_eq!(
            ctx.scales(keys::SCALES).unwrap_err(),
            ContextError::MissingKey { key: "scales".to_string() }
        );
        assert_eq!(
            ctx.settings(keys::USER_ID).unwrap_err(),
            ContextError::TypeMismatch {
                key: "user_id".to_string(),
                expected: "settings",
                found: "id",
            }
        );

        ctx.merge(Context::new().with(keys::USER_ID, ContextValue::Id(9)));
        assert_eq!(ctx.id(keys::USER_ID), Ok(9));
        assert_eq!(ctx.len(), keys::SEED.len());
    }
}
