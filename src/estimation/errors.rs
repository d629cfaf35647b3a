//! Errors for ability estimation and item calibration.
use crate::{models::ModelError, optimization::errors::OptError};

/// Result alias for estimator operations that may produce [`EstimatorError`].
pub type EstimatorResult<T> = Result<T, EstimatorError>;

#[derive(Debug, Clone, PartialEq)]
pub enum EstimatorError {
    // ---- Inputs ----
    /// No usable response to estimate from.
    NoResponses,

    /// A response references an item without stored parameters.
    UnknownItem { item_id: u64 },

    /// A person referenced by a calibration response has no ability.
    MissingAbility { person_id: u64 },

    /// Calibration weights must be finite and positive.
    InvalidWeight { index: usize, value: f64 },

    // ---- Options ----
    /// Ability bounds must be finite with `lower < upper`.
    InvalidBounds { lower: f64, upper: f64, reason: &'static str },

    /// The Gaussian prior could not be built.
    InvalidPrior { mean: f64, sd: f64, reason: String },

    /// Degenerate-pattern epsilon must lie in [0, 0.5).
    InvalidEpsilon { value: f64 },

    // ---- Wrapped ----
    Model(ModelError),
    Optimization(OptError),
}

impl std::error::Error for EstimatorError {}

impl std::fmt::Display for EstimatorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Inputs ----
            EstimatorError::NoResponses => write!(f, "No usable responses to estimate from"),
            EstimatorError::UnknownItem { item_id } => {
                write!(f, "No item parameters stored for item {item_id}")
            }
            EstimatorError::MissingAbility { person_id } => {
                write!(f, "No ability estimate for person {person_id}")
            }
            EstimatorError::InvalidWeight { index, value } => {
                write!(f, "Invalid response weight at index {index}: {value}")
            }

            // ---- Options ----
            EstimatorError::InvalidBounds { lower, upper, reason } => {
                write!(f, "Invalid ability bounds [{lower}, {upper}]: {reason}")
            }
            EstimatorError::InvalidPrior { mean, sd, reason } => {
                write!(f, "Invalid ability prior N({mean}, {sd}²): {reason}")
            }
            EstimatorError::InvalidEpsilon { value } => {
                write!(f, "Degenerate-pattern epsilon must lie in [0, 0.5), got {value}")
            }

            // ---- Wrapped ----
            EstimatorError::Model(err) => write!(f, "Model error: {err}"),
            EstimatorError::Optimization(err) => write!(f, "Optimization error: {err}"),
        }
    }
}

impl From<ModelError> for EstimatorError {
    fn from(err: ModelError) -> Self {
        EstimatorError::Model(err)
    }
}

impl From<OptError> for EstimatorError {
    fn from(err: OptError) -> Self {
        EstimatorError::Optimization(err)
    }
}

#[cfg(feature = "python-bindings")]
impl std::convert::From<EstimatorError> for pyo3::PyErr {
    fn from(err: EstimatorError) -> pyo3::PyErr {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}
