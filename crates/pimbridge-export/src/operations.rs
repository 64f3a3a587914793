//! Grouped category operations.

use serde::Serialize;

use pimbridge_connector::operation::{
    CategoryCreate, CategoryMove, CategoryUpdate, CategoryVariation,
};

/// Category operations grouped by kind.
///
/// Buckets only grow: [`append`](Self::append) moves every operation of
/// another set to the end of the matching bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizedOperationSet {
    #[serde(rename = "create")]
    pub creates: Vec<CategoryCreate>,
    #[serde(rename = "update")]
    pub updates: Vec<CategoryUpdate>,
    #[serde(rename = "move")]
    pub moves: Vec<CategoryMove>,
    #[serde(rename = "variation")]
    pub variations: Vec<CategoryVariation>,
}

impl NormalizedOperationSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move every operation of `other` into this set.
    pub fn append(&mut self, mut other: NormalizedOperationSet) {
        self.creates.append(&mut other.creates);
        self.updates.append(&mut other.updates);
        self.moves.append(&mut other.moves);
        self.variations.append(&mut other.variations);
    }

    /// Total number of operations.
    pub fn len(&self) -> usize {
        self.creates.len() + self.updates.len() + self.moves.len() + self.variations.len()
    }

    /// Check if every bucket is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
