//! Errors for flattening nested parameter trees into solver vectors.
//!
//! Every variant carries the slash-separated path of the offending node
//! (`/` is the root, `/items/0/difficulty` a nested leaf) so that a failed
//! encode can be traced back to the caller's structure.

/// Result alias for codec operations that may produce [`CodecError`].
pub type CodecResult<T> = Result<T, CodecError>;

/// Failure modes of [`crate::codec::try_encode`] and [`crate::codec::try_decode`].
#[derive(Debug, Clone, PartialEq)]
pub enum CodecError {
    // ---- Encoding ----
    /// A leaf is not numeric.
    NonNumericLeaf { path: String },

    /// A list or map with no children was reached from the root.
    EmptyCollection { path: String },

    // ---- Decoding ----
    /// The descriptor is the empty descriptor of a failed encode.
    EmptyDescriptor,

    /// A descriptor index points past the end of the vector.
    IndexOutOfRange { path: String, index: usize, len: usize },

    /// The vector holds a different number of entries than the descriptor has leaves.
    LengthMismatch { expected: usize, found: usize },
}

impl std::error::Error for CodecError {}

impl std::fmt::Display for CodecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Encoding ----
            CodecError::NonNumericLeaf { path } => {
                write!(f, "Non-numeric leaf at {path}")
            }
            CodecError::EmptyCollection { path } => {
                write!(f, "Empty collection at {path}")
            }

            // ---- Decoding ----
            CodecError::EmptyDescriptor => {
                write!(f, "Cannot decode against an empty descriptor")
            }
            CodecError::IndexOutOfRange { path, index, len } => {
                write!(f, "Descriptor index {index} at {path} out of range for vector of length {len}")
            }
            CodecError::LengthMismatch { expected, found } => {
                write!(f, "Vector length mismatch: descriptor has {expected} leaves, found {found}")
            }
        }
    }
}
