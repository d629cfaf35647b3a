//! codec — lossless flattening of nested parameter structures.
//!
//! Purpose
//! -------
//! Let the solvers operate on plain `Array1<f64>` vectors while models and
//! callers keep working with named, possibly nested parameter maps such as
//! `{difficulty, discrimination, guessing}`.
//!
//! Key behaviors
//! -------------
//! - [`ParamTree`] is the closed value tree (numeric/text leaves, ordered
//!   lists, ordered maps).
//! - [`encode`] / [`decode`] convert between a tree and an [`Encoded`]
//!   `(vector, descriptor)` pair, returning an empty result on failure.
//! - [`try_encode`] / [`try_decode`] surface the same failures as
//!   [`CodecError`].
//!
//! Downstream usage
//! ----------------
//! - `optimization::newton` encodes the initial guess once, decodes every
//!   iterate before calling the score function, and re-encodes the returned
//!   gradient so arbitrary shapes are supported transparently.
//! - `models::params` builds and reads item parameter trees.

pub mod errors;
pub mod tree;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::errors::{CodecError, CodecResult};
pub use self::tree::{Descriptor, Encoded, ParamTree, decode, encode, try_decode, try_encode};

pub mod prelude {
    pub use super::errors::{CodecError, CodecResult};
    pub use super::tree::{Descriptor, Encoded, ParamTree, decode, encode, try_decode, try_encode};
}
