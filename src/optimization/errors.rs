use argmin::core::{ArgminError, Error};

use crate::codec::errors::CodecError;

/// Crate-wide result alias for optimizer operations.
pub type OptResult<T> = Result<T, OptError>;

/// Unified error type for the Newton solver and the L-BFGS fallback.
#[derive(Debug, Clone, PartialEq)]
pub enum OptError {
    // ---- Gradient ----
    /// Implies that finite differences should be used.
    GradientNotImplemented,

    /// Gradient dimensions do not match parameter dimensions.
    GradientDimMismatch { expected: usize, found: usize },

    /// Gradient elements need to be finite.
    InvalidGradient { index: usize, value: f64, reason: &'static str },

    // ---- MLEOptions ----
    /// Gradient tolerance needs to be positive and finite.
    InvalidTolGrad { tol: f64, reason: &'static str },

    /// Cost change tolerance needs to be positive and finite.
    InvalidTolCost { tol: f64, reason: &'static str },

    /// Maximum iterations needs to be positive.
    InvalidMaxIter { max_iter: usize, reason: &'static str },

    /// At least one tolerance must be provided.
    NoTolerancesProvided,

    /// Invalid line searcher name.
    InvalidLineSearch { name: String, reason: &'static str },

    /// lbfgs_mem needs to be at least 1.
    InvalidLBFGSMem { mem: usize, reason: &'static str },

    // ---- NewtonOptions ----
    /// Step tolerance needs to be positive and finite.
    InvalidStepTolerance { tol: f64, reason: &'static str },

    /// Maximum step length needs to be positive and finite.
    InvalidMaxStep { value: f64, reason: &'static str },

    /// Ridge floor needs to be positive and finite.
    InvalidRidge { value: f64, reason: &'static str },

    // ---- Codec ----
    /// The parameter structure could not be flattened or rebuilt.
    EncodingFailed { reason: String },

    // ---- Cost function ----
    /// Objective returned a non-finite value.
    NonFiniteCost { value: f64 },

    /// The objective could not be evaluated at the current point.
    ObjectiveFailed { reason: String },

    // ---- Newton step ----
    /// The Newton step contained a non-finite entry even after stabilization.
    NonFiniteStep { index: usize, value: f64 },

    // ---- Optimizer outcome ----
    /// Estimated parameters must be finite.
    InvalidThetaHat { index: usize, value: f64, reason: &'static str },

    /// Theta hat is missing.
    MissingThetaHat,

    // ---- Argmin ---
    /// Wrapper for argmin::InvalidParameter
    InvalidParameter { text: String },
    /// Wrapper for argmin::NotImplemented
    NotImplemented { text: String },
    /// Wrapper for argmin::NotInitialized
    NotInitialized { text: String },
    /// Wrapper for argmin::ConditionViolated
    ConditionViolated { text: String },
    /// Wrapper for argmin::CheckPointNotFound
    CheckPointNotFound { text: String },
    /// Wrapper for argmin::PotentialBug
    PotentialBug { text: String },
    /// Wrapper for argmin::ImpossibleError
    ImpossibleError { text: String },
    /// Wrapper for other argmin::Error types
    BackendError { text: String },

    // ---- Curvature ----
    /// Hessian matrix dimensions do not match parameter dimensions.
    HessianDimMismatch { expected: usize, found: (usize, usize) },

    /// Hessian values need to be finite.
    InvalidHessian { row: usize, col: usize, value: f64 },

    // ---- Fallback ----
    UnknownError,
}

impl std::error::Error for OptError {}

impl std::fmt::Display for OptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Gradient ----
            OptError::GradientNotImplemented => {
                write!(f, "Analytic gradient not implemented")
            }
            OptError::GradientDimMismatch { expected, found } => {
                write!(f, "Gradient dimension mismatch: expected {expected}, found {found}")
            }
            OptError::InvalidGradient { index, value, reason } => {
                write!(f, "Invalid gradient at index {index}: {value}: {reason}")
            }

            // ---- MLEOptions ----
            OptError::InvalidTolGrad { tol, reason } => {
                write!(f, "Invalid gradient tolerance {tol}: {reason}")
            }
            OptError::InvalidTolCost { tol, reason } => {
                write!(f, "Invalid cost function change tolerance {tol}: {reason}")
            }
            OptError::InvalidMaxIter { max_iter, reason } => {
                write!(f, "Invalid maximum iterations {max_iter}: {reason}")
            }
            OptError::NoTolerancesProvided => {
                write!(f, "No tolerances provided")
            }
            OptError::InvalidLineSearch { name, reason } => {
                write!(f, "Invalid line searcher '{name}': {reason}")
            }
            OptError::InvalidLBFGSMem { mem, reason } => {
                write!(f, "Invalid L-BFGS memory {mem}: {reason}")
            }

            // ---- NewtonOptions ----
            OptError::InvalidStepTolerance { tol, reason } => {
                write!(f, "Invalid Newton step tolerance {tol}: {reason}")
            }
            OptError::InvalidMaxStep { value, reason } => {
                write!(f, "Invalid maximum Newton step {value}: {reason}")
            }
            OptError::InvalidRidge { value, reason } => {
                write!(f, "Invalid ridge floor {value}: {reason}")
            }

            // ---- Codec ----
            OptError::EncodingFailed { reason } => {
                write!(f, "Parameter encoding failed: {reason}")
            }

            // ---- Cost function ----
            OptError::NonFiniteCost { value } => {
                write!(f, "Non-finite objective value: {value}")
            }
            OptError::ObjectiveFailed { reason } => {
                write!(f, "Objective evaluation failed: {reason}")
            }

            // ---- Newton step ----
            OptError::NonFiniteStep { index, value } => {
                write!(f, "Non-finite Newton step at index {index}: {value}")
            }

            // ---- Optimizer outcome ----
            OptError::InvalidThetaHat { index, value, reason } => {
                write!(f, "Invalid estimated parameter at index {index}: {value}: {reason}")
            }
            OptError::MissingThetaHat => {
                write!(f, "Missing estimated parameters (theta hat)")
            }

            // ---- Argmin ----
            OptError::InvalidParameter { text } => {
                write!(f, "Invalid parameter: {text}")
            }
            OptError::NotImplemented { text } => {
                write!(f, "Not implemented: {text}")
            }
            OptError::NotInitialized { text } => {
                write!(f, "Not initialized: {text}")
            }
            OptError::ConditionViolated { text } => {
                write!(f, "Condition violated: {text}")
            }
            OptError::CheckPointNotFound { text } => {
                write!(f, "Checkpoint not found: {text}")
            }
            OptError::PotentialBug { text } => {
                write!(f, "Potential bug: {text}")
            }
            OptError::ImpossibleError { text } => {
                write!(f, "Impossible error: {text}")
            }
            OptError::BackendError { text } => {
                write!(f, "Backend error: {text}")
            }

            // ---- Curvature ----
            OptError::HessianDimMismatch { expected, found } => {
                write!(
                    f,
                    "Hessian dimension mismatch: expected ({expected}, {expected}), found {found:?}"
                )
            }
            OptError::InvalidHessian { row, col, value } => {
                write!(f, "Invalid Hessian at ({row}, {col}): {value}, must be finite")
            }

            // ---- Fallback ----
            OptError::UnknownError => {
                write!(f, "Unknown error")
            }
        }
    }
}

impl From<Error> for OptError {
    fn from(original_err: Error) -> Self {
        match original_err.downcast::<ArgminError>() {
            Ok(opt_err) => match opt_err {
                ArgminError::InvalidParameter { text } => OptError::InvalidParameter { text },
                ArgminError::NotImplemented { text } => OptError::NotImplemented { text },
                ArgminError::NotInitialized { text } => OptError::NotInitialized { text },
                ArgminError::ConditionViolated { text } => OptError::ConditionViolated { text },
                ArgminError::CheckpointNotFound { text } => OptError::CheckPointNotFound { text },
                ArgminError::PotentialBug { text } => OptError::PotentialBug { text },
                ArgminError::ImpossibleError { text } => OptError::ImpossibleError { text },
                _ => OptError::UnknownError,
            },
            Err(err) => match err.downcast::<OptError>() {
                Ok(own) => own,
                Err(other) => OptError::BackendError { text: other.to_string() },
            },
        }
    }
}

impl From<CodecError> for OptError {
    fn from(err: CodecError) -> Self {
        OptError::EncodingFailed { reason: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Mapping of argmin errors into `OptError`.
    // - Round-tripping of our own `OptError` through `argmin::core::Error`,
    //   which happens whenever a cost closure fails inside the L-BFGS path.
    // - Conversion of codec failures.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Verify that an `ArgminError` is mapped onto its wrapper variant.
    //
    // Given
    // -----
    // - An `ArgminError::NotInitialized` boxed into `argmin::core::Error`.
    //
    // Expect
    // ------
    // - `OptError::NotInitialized` with the same text.
    fn argmin_errors_map_to_wrapper_variants() {
        let err: Error = ArgminError::NotInitialized { text: "no param".to_string() }.into();
        assert_eq!(OptError::from(err), OptError::NotInitialized { text: "no param".to_string() });
    }

    #[test]
    // Purpose
    // -------
    // Ensure that an `OptError` raised inside an argmin callback survives the
    // trip through `argmin::core::Error` unchanged.
    //
    // Given
    // -----
    // - `OptError::NonFiniteCost` converted into `argmin::core::Error`.
    //
    // Expect
    // ------
    // - Converting back yields the original variant.
    fn own_errors_round_trip_through_argmin_error() {
        let err: Error = OptError::NonFiniteCost { value: f64::INFINITY }.into();
        assert_eq!(OptError::from(err), OptError::NonFiniteCost { value: f64::INFINITY });
    }

    #[test]
    // Purpose
    // -------
    // Check that codec failures surface as `EncodingFailed`.
    //
    // Given
    // -----
    // - A `CodecError::EmptyCollection` at some path.
    //
    // Expect
    // ------
    // - `OptError::EncodingFailed` whose reason mentions the path.
    fn codec_errors_become_encoding_failed() {
        let err = OptError::from(CodecError::EmptyCollection { path: "/items".to_string() });
        match err {
            OptError::EncodingFailed { reason } => assert!(reason.contains("/items")),
            other => panic!("Expected EncodingFailed, got {other:?}"),
        }
    }
}
