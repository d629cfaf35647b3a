//! Errors for response models and item parameter records.
use crate::codec::CodecError;

/// Result alias for model operations that may produce [`ModelError`].
pub type ModelResult<T> = Result<T, ModelError>;

/// Failures while reading, validating or evaluating item parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    // ---- Model identity ----
    /// Model name not recognized.
    UnknownModel { name: String },

    /// Information criterion name not recognized.
    UnknownCriterion { name: String },

    // ---- Parameters ----
    /// A parameter the model needs is absent from the parameter tree.
    MissingParameter { name: &'static str },

    /// Parameter value must be finite.
    NonFiniteParameter { name: &'static str, value: f64 },

    /// Parameter value outside its admissible range.
    InvalidParameter { name: &'static str, value: f64, reason: &'static str },

    /// The parameter tree could not be encoded.
    Encoding { reason: String },

    // ---- Response data ----
    /// Paired response slices differ in length.
    LengthMismatch { expected: usize, found: usize },

    /// Observed fraction must lie in [0, 1].
    InvalidFraction { index: usize, value: f64 },

    /// Information criteria need at least one response.
    NoResponses,
}

impl std::error::Error for ModelError {}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Model identity ----
            ModelError::UnknownModel { name } => write!(f, "Unknown response model '{name}'"),
            ModelError::UnknownCriterion { name } => {
                write!(f, "Unknown information criterion '{name}'")
            }

            // ---- Parameters ----
            ModelError::MissingParameter { name } => write!(f, "Missing item parameter '{name}'"),
            ModelError::NonFiniteParameter { name, value } => {
                write!(f, "Item parameter '{name}' must be finite, got {value}")
            }
            ModelError::InvalidParameter { name, value, reason } => {
                write!(f, "Invalid item parameter '{name}' = {value}: {reason}")
            }
            ModelError::Encoding { reason } => write!(f, "Parameter encoding failed: {reason}"),

            // ---- Response data ----
            ModelError::LengthMismatch { expected, found } => {
                write!(f, "Response length mismatch: expected {expected}, found {found}")
            }
            ModelError::InvalidFraction { index, value } => {
                write!(f, "Response fraction at index {index} must lie in [0, 1], got {value}")
            }
            ModelError::NoResponses => write!(f, "At least one response is required"),
        }
    }
}

impl From<CodecError> for ModelError {
    fn from(err: CodecError) -> Self {
        ModelError::Encoding { reason: err.to_string() }
    }
}

#[cfg(feature = "python-bindings")]
impl std::convert::From<ModelError> for pyo3::PyErr {
    fn from(err: ModelError) -> pyo3::PyErr {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}
