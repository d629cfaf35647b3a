//! Errors raised while assembling a question-selection context.
//!
//! Configuration faults (duplicate or missing providers, cycles) surface
//! once from [`crate::context::Pipeline::new`]; the remaining variants are
//! per-request failures of loaders, collaborators, or context access.
use crate::models::ModelError;

/// Result alias for context assembly.
pub type ContextResult<T> = Result<T, ContextError>;

#[derive(Debug, Clone, PartialEq)]
pub enum ContextError {
    // ---- Context access ----
    /// A key was read before any loader or seed provided it.
    MissingKey { key: String },

    /// The stored value has a different variant than the getter expects.
    TypeMismatch { key: String, expected: &'static str, found: &'static str },

    // ---- Pipeline configuration ----
    /// Two loaders (or a loader and the seed) provide the same key.
    DuplicateProvider { key: String, first: String, second: String },

    /// A required key is neither seeded nor provided by any loader.
    MissingProvider { loader: &'static str, key: String },

    /// The provides/requires graph contains a cycle through these loaders.
    Cycle { loaders: Vec<&'static str> },

    /// The seed context lacks a declared seed key.
    MissingSeed { key: String },

    // ---- Loader output ----
    /// A loader returned without one of the keys it declares.
    MissingOutput { loader: &'static str, key: String },

    // ---- Domain ----
    /// Scale id not present in the catalog.
    UnknownScale { scale_id: u64 },

    /// Answered fraction must lie in [0, 1].
    InvalidFraction { question_id: u64, value: f64 },

    /// CAT settings out of range.
    InvalidSettings { name: &'static str, value: f64, reason: &'static str },

    /// Item parameters of a non-pilot question could not be read.
    Model(ModelError),

    // ---- Collaborators ----
    /// Repository, store, or cache failure.
    Repository(String),
}

impl std::error::Error for ContextError {}

impl std::fmt::Display for ContextError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Context access ----
            ContextError::MissingKey { key } => write!(f, "Context key '{key}' is missing"),
            ContextError::TypeMismatch { key, expected, found } => {
                write!(f, "Context key '{key}' holds {found}, expected {expected}")
            }

            // ---- Pipeline configuration ----
            ContextError::DuplicateProvider { key, first, second } => {
                write!(f, "Context key '{key}' is provided by both '{first}' and '{second}'")
            }
            ContextError::MissingProvider { loader, key } => {
                write!(f, "Loader '{loader}' requires '{key}', which nothing provides")
            }
            ContextError::Cycle { loaders } => {
                write!(f, "Loader dependency cycle through: {}", loaders.join(", "))
            }
            ContextError::MissingSeed { key } => write!(f, "Seed context lacks key '{key}'"),

            // ---- Loader output ----
            ContextError::MissingOutput { loader, key } => {
                write!(f, "Loader '{loader}' did not provide declared key '{key}'")
            }

            // ---- Domain ----
            ContextError::UnknownScale { scale_id } => write!(f, "Unknown scale {scale_id}"),
            ContextError::InvalidFraction { question_id, value } => {
                write!(f, "Fraction for question {question_id} must lie in [0, 1], got {value}")
            }
            ContextError::InvalidSettings { name, value, reason } => {
                write!(f, "Invalid CAT setting '{name}' = {value}: {reason}")
            }
            ContextError::Model(err) => write!(f, "{err}"),

            // ---- Collaborators ----
            ContextError::Repository(msg) => write!(f, "Repository error: {msg}"),
        }
    }
}

impl From<anyhow::Error> for ContextError {
    fn from(err: anyhow::Error) -> Self {
        ContextError::Repository(format!("{err:#}"))
    }
}

impl From<ModelError> for ContextError {
    fn from(err: ModelError) -> Self {
        ContextError::Model(err)
    }
}

#[cfg(feature = "python-bindings")]
impl std::convert::From<ContextError> for pyo3::PyErr {
    fn from(err: ContextError) -> pyo3::PyErr {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    // Purpose
    // -------
    // Collaborator failures keep their whole context chain.
    //
    // Given
    // -----
    // - An anyhow error with one added context layer.
    //
    // Expect
    // ------
    // - `Repository` whose message holds both layers.
    fn anyhow_errors_keep_their_chain() {
        let err = anyhow!("connection refused").context("loading progress");

        let converted = ContextError::from(err);

        assert_eq!(
            converted,
            ContextError::Repository("loading progress: connection refused".to_string())
        );
    }
}
