//! Mergeable sample collections.
//!
//! A `MergeableCollection<T>` is an unordered multiset: merging two
//! collections is plain concatenation, which makes the operation
//! associative and commutative and lets independent measurement runs be
//! unioned into one statistically usable dataset.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A type equipped with an associative, commutative combine operation.
///
/// **Public** - the capability seam the tree merge is built on
///
/// Implementations must satisfy, up to multiset equality:
/// * `merge(merge(a, b), c) == merge(a, merge(b, c))`
/// * `merge(a, b) == merge(b, a)`
pub trait Mergeable {
    /// Fold `other` into `self`
    fn merge(&mut self, other: Self);
}

/// Unordered multiset of samples of one type.
///
/// **Public** - per-node payload of the measurement tree
///
/// Duplicates are retained and order is irrelevant. Created empty or from
/// an initial set; grows only via `merge`; read by the outlier cleaner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MergeableCollection<T> {
    items: Vec<T>,
}

impl<T> MergeableCollection<T> {
    /// Create an empty collection
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Create a collection holding a single sample
    ///
    /// **Public** - what the recorder merges into a leaf on every exit
    pub fn of(item: T) -> Self {
        Self { items: vec![item] }
    }

    /// Number of samples held
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if no samples are held
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate over the samples (no ordering guarantee)
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<T> From<Vec<T>> for MergeableCollection<T> {
    fn from(items: Vec<T>) -> Self {
        Self { items }
    }
}

impl<T> Mergeable for MergeableCollection<T> {
    fn merge(&mut self, other: Self) {
        self.items.extend(other.items);
    }
}

impl<T> fmt::Display for MergeableCollection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} samples", self.items.len())
    }
}
