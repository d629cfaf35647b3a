//! codec::tree — parameter trees, descriptors and the flat-vector codec.
//!
//! Purpose
//! -------
//! Represent named item/person parameters as a small closed tree and move
//! them losslessly in and out of the flat `Array1<f64>` the solvers work on.
//!
//! Key behaviors
//! -------------
//! - [`encode`] walks a [`ParamTree`] depth-first, assigning each numeric
//!   leaf the next position of the flat vector in first-seen order, and
//!   returns a [`Descriptor`] of the same shape holding those positions.
//! - [`decode`] rebuilds the tree by substituting each descriptor index with
//!   the corresponding vector entry. Leaves always come back as
//!   [`ParamTree::Number`].
//! - Failure is all-or-nothing: a single text leaf or empty collection
//!   anywhere in the tree yields [`Encoded::default`] (empty vector, empty
//!   descriptor). [`try_encode`] / [`try_decode`] report the same failures
//!   as a typed [`CodecError`].
//!
//! Invariants & assumptions
//! ------------------------
//! - `decode(&encode(x)) == x` for every tree of `Number` leaves with no
//!   empty collection; `Integer` leaves come back promoted to `Number`.
//! - A successful encode always has at least one leaf, so an empty vector
//!   is an unambiguous failure signal ([`Encoded::is_empty`]).
//! - Map children keep insertion order; keys are not sorted.
//!
//! Testing notes
//! -------------
//! - Unit tests cover leaf ordering, nested maps and lists, integer
//!   promotion, and the all-or-nothing failure on nested empty branches.
use ndarray::Array1;

use crate::codec::errors::{CodecError, CodecResult};

/// Nested named/ordered parameter structure.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamTree {
    Number(f64),
    Integer(i64),
    /// Non-numeric leaf. Present so that callers can hand over raw records;
    /// encoding a tree that contains one fails.
    Text(String),
    List(Vec<ParamTree>),
    /// Ordered map; insertion order defines encoding order.
    Map(Vec<(String, ParamTree)>),
}

impl ParamTree {
    /// Build a flat map of numeric leaves from `(name, value)` pairs.
    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, f64)>) -> Self {
        ParamTree::Map(entries.into_iter().map(|(k, v)| (k.into(), ParamTree::Number(v))).collect())
    }

    /// The empty result returned by [`decode`] on failure.
    pub fn empty() -> Self {
        ParamTree::Map(Vec::new())
    }

    /// `true` for lists and maps without children.
    pub fn is_empty(&self) -> bool {
        match self {
            ParamTree::List(items) => items.is_empty(),
            ParamTree::Map(entries) => entries.is_empty(),
            _ => false,
        }
    }

    /// Child of a map node by key.
    pub fn get(&self, key: &str) -> Option<&ParamTree> {
        match self {
            ParamTree::Map(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Numeric value of a leaf, promoting integers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamTree::Number(v) => Some(*v),
            ParamTree::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Shorthand for `get(key)` followed by `as_f64`.
    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(ParamTree::as_f64)
    }

    /// Insert or overwrite a numeric entry of a map node. No-op on other nodes.
    pub fn set_number(&mut self, key: &str, value: f64) {
        if let ParamTree::Map(entries) = self {
            match entries.iter_mut().find(|(k, _)| k == key) {
                Some((_, slot)) => *slot = ParamTree::Number(value),
                None => entries.push((key.to_string(), ParamTree::Number(value))),
            }
        }
    }
}

impl From<f64> for ParamTree {
    fn from(value: f64) -> Self {
        ParamTree::Number(value)
    }
}

/// Shape of an encoded tree with vector positions at the leaves.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Descriptor {
    /// Descriptor of a failed encode.
    #[default]
    Empty,
    Index(usize),
    List(Vec<Descriptor>),
    Map(Vec<(String, Descriptor)>),
}

impl Descriptor {
    /// Number of leaves (equals the length of the matching vector).
    pub fn leaf_count(&self) -> usize {
        match self {
            Descriptor::Empty => 0,
            Descriptor::Index(_) => 1,
            Descriptor::List(items) => items.iter().map(Descriptor::leaf_count).sum(),
            Descriptor::Map(entries) => entries.iter().map(|(_, d)| d.leaf_count()).sum(),
        }
    }
}

/// Flat vector plus the descriptor needed to rebuild the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Encoded {
    pub vector: Array1<f64>,
    pub descriptor: Descriptor,
}

impl Default for Encoded {
    fn default() -> Self {
        Self { vector: Array1::zeros(0), descriptor: Descriptor::Empty }
    }
}

impl Encoded {
    /// `true` when encoding failed. Callers must not read this as "no parameters".
    pub fn is_empty(&self) -> bool {
        self.vector.is_empty()
    }
}

/// Flatten `tree`, returning the empty [`Encoded`] on any failure.
pub fn encode(tree: &ParamTree) -> Encoded {
    try_encode(tree).unwrap_or_default()
}

/// Rebuild a tree from `vector`, returning [`ParamTree::empty`] on any failure.
pub fn decode(vector: &Array1<f64>, descriptor: &Descriptor) -> ParamTree {
    try_decode(vector, descriptor).unwrap_or_else(|_| ParamTree::empty())
}

/// Flatten `tree` into a vector and descriptor.
///
/// # Errors
/// - [`CodecError::NonNumericLeaf`] for a `Text` leaf.
/// - [`CodecError::EmptyCollection`] for a list or map without children,
///   including the root. The whole encode is aborted; no partial result.
pub fn try_encode(tree: &ParamTree) -> CodecResult<Encoded> {
    let mut values = Vec::new();
    let descriptor = encode_node(tree, &mut values, &mut String::new())?;
    Ok(Encoded { vector: Array1::from(values), descriptor })
}

/// Rebuild a tree from `vector` and `descriptor`.
///
/// # Errors
/// - [`CodecError::EmptyDescriptor`] when `descriptor` came from a failed encode.
/// - [`CodecError::LengthMismatch`] when the vector and descriptor disagree
///   on the number of leaves.
/// - [`CodecError::IndexOutOfRange`] for an index past the end of `vector`.
pub fn try_decode(vector: &Array1<f64>, descriptor: &Descriptor) -> CodecResult<ParamTree> {
    if *descriptor == Descriptor::Empty {
        return Err(CodecError::EmptyDescriptor);
    }
    let expected = descriptor.leaf_count();
    if expected != vector.len() {
        return Err(CodecError::LengthMismatch { expected, found: vector.len() });
    }
    decode_node(vector, descriptor, &mut String::new())
}

// ---- Helper methods ----

fn encode_node(node: &ParamTree, values: &mut Vec<f64>, path: &mut String) -> CodecResult<Descriptor> {
    match node {
        ParamTree::Number(v) => {
            values.push(*v);
            Ok(Descriptor::Index(values.len() - 1))
        }
        ParamTree::Integer(v) => {
            values.push(*v as f64);
            Ok(Descriptor::Index(values.len() - 1))
        }
        ParamTree::Text(_) => Err(CodecError::NonNumericLeaf { path: display_path(path) }),
        ParamTree::List(items) => {
            if items.is_empty() {
                return Err(CodecError::EmptyCollection { path: display_path(path) });
            }
            let mut children = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                let mark = path.len();
                path.push_str(&format!("/{i}"));
                children.push(encode_node(item, values, path)?);
                path.truncate(mark);
            }
            Ok(Descriptor::List(children))
        }
        ParamTree::Map(entries) => {
            if entries.is_empty() {
                return Err(CodecError::EmptyCollection { path: display_path(path) });
            }
            let mut children = Vec::with_capacity(entries.len());
            for (key, item) in entries {
                let mark = path.len();
                path.push('/');
                path.push_str(key);
                children.push((key.clone(), encode_node(item, values, path)?));
                path.truncate(mark);
            }
            Ok(Descriptor::Map(children))
        }
    }
}

fn decode_node(vector: &Array1<f64>, descriptor: &Descriptor, path: &mut String) -> CodecResult<ParamTree> {
    match descriptor {
        Descriptor::Empty => Err(CodecError::EmptyDescriptor),
        Descriptor::Index(index) => match vector.get(*index) {
            Some(v) => Ok(ParamTree::Number(*v)),
            None => Err(CodecError::IndexOutOfRange {
                path: display_path(path),
                index: *index,
                len: vector.len(),
            }),
        },
        Descriptor::List(items) => {
            let mut children = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                let mark = path.len();
                path.push_str(&format!("/{i}"));
                children.push(decode_node(vector, item, path)?);
                path.truncate(mark);
            }
            Ok(ParamTree::List(children))
        }
        Descriptor::Map(entries) => {
            let mut children = Vec::with_capacity(entries.len());
            for (key, item) in entries {
                let mark = path.len();
                path.push('/');
                path.push_str(key);
                children.push((key.clone(), decode_node(vector, item, path)?));
                path.truncate(mark);
            }
            Ok(ParamTree::Map(children))
        }
    }
}

fn display_path(path: &str) -> String {
    if path.is_empty() { "/".to_string() } else { path.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Depth-first, first-seen leaf ordering for nested maps and lists.
    // - Lossless decode of encoded trees and integer promotion.
    // - All-or-nothing failure for text leaves and empty collections.
    // - Descriptor/vector mismatch detection in `try_decode`.
    // -------------------------------------------------------------------------

    fn nested_item() -> ParamTree {
        ParamTree::Map(vec![
            ("difficulty".to_string(), ParamTree::Number(0.05)),
            (
                "slopes".to_string(),
                ParamTree::List(vec![ParamTree::Number(5.95), ParamTree::Number(1.2)]),
            ),
            ("guessing".to_string(), ParamTree::Number(0.2)),
        ])
    }

    #[test]
    // Purpose
    // -------
    // Verify that leaves are laid out depth-first in first-seen order and
    // that the descriptor mirrors the input shape.
    //
    // Given
    // -----
    // - A map with a scalar, a two-element list and another scalar.
    //
    // Expect
    // ------
    // - Vector [0.05, 5.95, 1.2, 0.2] and indices 0, [1, 2], 3.
    fn encode_orders_leaves_depth_first() {
        // Arrange
        let tree = nested_item();

        // Act
        let encoded = encode(&tree);

        // Assert
        assert_eq!(encoded.vector, array![0.05, 5.95, 1.2, 0.2]);
        assert_eq!(
            encoded.descriptor,
            Descriptor::Map(vec![
                ("difficulty".to_string(), Descriptor::Index(0)),
                (
                    "slopes".to_string(),
                    Descriptor::List(vec![Descriptor::Index(1), Descriptor::Index(2)])
                ),
                ("guessing".to_string(), Descriptor::Index(3)),
            ])
        );
    }

    #[test]
    // Purpose
    // -------
    // Check the round trip and integer promotion.
    //
    // Given
    // -----
    // - A nested numeric tree, and a list holding the integer 9.
    //
    // Expect
    // ------
    // - The nested tree decodes back unchanged.
    // - `[9]` encodes to `[9.0]` and decodes to `[Number(9.0)]`.
    fn decode_inverts_encode_and_promotes_integers() {
        // Arrange
        let tree = nested_item();
        let ints = ParamTree::List(vec![ParamTree::Integer(9)]);

        // Act
        let encoded = encode(&tree);
        let encoded_ints = encode(&ints);

        // Assert
        assert_eq!(decode(&encoded.vector, &encoded.descriptor), tree);
        assert_eq!(encoded_ints.vector, array![9.0]);
        assert_eq!(
            decode(&encoded_ints.vector, &encoded_ints.descriptor),
            ParamTree::List(vec![ParamTree::Number(9.0)])
        );
    }

    #[test]
    // Purpose
    // -------
    // Ensure that an empty branch below the root aborts the whole encode
    // rather than being skipped.
    //
    // Given
    // -----
    // - A map whose second entry is an empty list.
    //
    // Expect
    // ------
    // - `encode` returns the empty result.
    // - `try_encode` names the empty branch.
    fn nested_empty_collection_fails_whole_encode() {
        // Arrange
        let tree = ParamTree::Map(vec![
            ("difficulty".to_string(), ParamTree::Number(1.0)),
            ("extra".to_string(), ParamTree::List(Vec::new())),
        ]);

        // Act
        let encoded = encode(&tree);
        let err = try_encode(&tree).expect_err("empty branch must fail");

        // Assert
        assert!(encoded.is_empty());
        assert_eq!(encoded.descriptor, Descriptor::Empty);
        assert_eq!(err, CodecError::EmptyCollection { path: "/extra".to_string() });
    }

    #[test]
    // Purpose
    // -------
    // Ensure that a text leaf fails the encode.
    //
    // Given
    // -----
    // - A list whose second element is text.
    //
    // Expect
    // ------
    // - Empty result and `NonNumericLeaf` at `/1`.
    fn text_leaf_fails_encode() {
        let tree = ParamTree::List(vec![ParamTree::Number(1.0), ParamTree::Text("x".into())]);

        assert!(encode(&tree).is_empty());
        assert_eq!(
            try_encode(&tree).expect_err("text leaf must fail"),
            CodecError::NonNumericLeaf { path: "/1".to_string() }
        );
    }

    #[test]
    // Purpose
    // -------
    // Verify decode-side validation.
    //
    // Given
    // -----
    // - The empty descriptor and a descriptor with two leaves paired with a
    //   one-element vector.
    //
    // Expect
    // ------
    // - `EmptyDescriptor` and `LengthMismatch`; `decode` returns the empty tree.
    fn try_decode_rejects_mismatched_inputs() {
        // Arrange
        let two = Descriptor::List(vec![Descriptor::Index(0), Descriptor::Index(1)]);
        let v = array![1.0];

        // Act / Assert
        assert_eq!(try_decode(&v, &Descriptor::Empty), Err(CodecError::EmptyDescriptor));
        assert_eq!(try_decode(&v, &two), Err(CodecError::LengthMismatch { expected: 2, found: 1 }));
        assert!(decode(&v, &two).is_empty());
    }
}
