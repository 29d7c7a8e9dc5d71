//! Adjacency list output

use serde::{Deserialize, Serialize};

use crate::validate::ValidatedSet;

/// One parent/child edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AdjacencyRow {
    /// Parent identifier
    pub parent: String,
    /// Child identifier
    pub child: String,
}

impl AdjacencyRow {
    /// Create an edge.
    pub fn new(parent: impl Into<String>, child: impl Into<String>) -> Self {
        Self {
            parent: parent.into(),
            child: child.into(),
        }
    }
}

/// One row per record that has a parent, in input order.
///
/// Rows are never re-sorted; callers that need an ordering sort themselves.
pub fn build_adjacency(set: &ValidatedSet) -> Vec<AdjacencyRow> {
    set.elements()
        .iter()
        .filter_map(|element| {
            element
                .parent
                .as_ref()
                .map(|parent| AdjacencyRow::new(parent.clone(), element.identifier.clone()))
        })
        .collect()
}
