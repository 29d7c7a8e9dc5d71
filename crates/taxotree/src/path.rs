//! Materialized path output
//!
//! Each record gets the full chain of identifiers from its root down to
//! itself. Paths are resolved with memoization: a walk up the parent links
//! stops at the first ancestor whose path is already known and extends it,
//! so every parent link is followed once over the whole set.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::StructuralError;
use crate::validate::ValidatedSet;

/// Separator used by [`MaterializedPathRow::full_path`].
pub const FULL_PATH_SEPARATOR: &str = " > ";

/// Materialized path rows keyed by identifier, in input order.
pub type PathTable = IndexMap<String, MaterializedPathRow>;

/// The root-to-element chain of one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterializedPathRow {
    /// Element identifier
    pub identifier: String,

    /// Identifiers from the root to the element, both included
    pub path: Vec<String>,

    /// Labels along the same chain (identifier where a record has no label)
    pub labels: Vec<String>,

    /// Distance from the root; the root itself is 0
    pub depth: usize,

    /// Presentation group of the element, from its `group_name` field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl MaterializedPathRow {
    /// First identifier on the path.
    pub fn root(&self) -> &str {
        self.path.first().map(String::as_str).unwrap_or(&self.identifier)
    }

    /// Identifier of the direct parent, `None` for a root.
    pub fn parent(&self) -> Option<&str> {
        self.path
            .len()
            .checked_sub(2)
            .map(|idx| self.path[idx].as_str())
    }

    /// Human-readable path: the group name, when there is one, then the
    /// labels from the root down, joined with `" > "`.
    pub fn full_path(&self) -> String {
        self.group
            .iter()
            .chain(&self.labels)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(FULL_PATH_SEPARATOR)
    }

    /// Check if `identifier` is on this row's path above the element.
    pub fn has_ancestor(&self, identifier: &str) -> bool {
        self.path.iter().take(self.depth).any(|id| id == identifier)
    }
}

/// Resolve the path of every record.
///
/// Fails with [`StructuralError::UnresolvedPath`] only when the set was
/// built with [`ValidatedSet::assume_valid`] and holds a dangling parent or
/// a cycle.
pub fn build_materialized_path(set: &ValidatedSet) -> Result<PathTable, StructuralError> {
    let elements = set.elements();
    let mut resolved: Vec<Option<Vec<usize>>> = vec![None; elements.len()];
    let mut on_walk = vec![false; elements.len()];
    let mut walk = Vec::new();

    for start in 0..elements.len() {
        if resolved[start].is_some() {
            continue;
        }

        walk.clear();
        let mut current = start;
        let mut prefix = loop {
            if let Some(known) = &resolved[current] {
                break known.clone();
            }
            if on_walk[current] {
                return Err(unresolved(set, start, "parent chain loops back on itself"));
            }
            on_walk[current] = true;
            walk.push(current);

            match set.parent_position(current) {
                Ok(None) => break Vec::new(),
                Ok(Some(parent)) => current = parent,
                Err(missing) => {
                    let reason = format!("parent '{}' does not exist", missing);
                    return Err(unresolved(set, current, reason));
                }
            }
        };

        for &pos in walk.iter().rev() {
            on_walk[pos] = false;
            prefix.push(pos);
            resolved[pos] = Some(prefix.clone());
        }
    }

    let table: PathTable = elements
        .iter()
        .zip(resolved)
        .map(|(element, positions)| {
            let positions = positions.unwrap_or_default();
            let row = MaterializedPathRow {
                identifier: element.identifier.clone(),
                depth: positions.len().saturating_sub(1),
                path: positions
                    .iter()
                    .map(|&pos| elements[pos].identifier.clone())
                    .collect(),
                labels: positions
                    .iter()
                    .map(|&pos| elements[pos].display_label().to_string())
                    .collect(),
                group: element.group_name().map(str::to_string),
            };
            (element.identifier.clone(), row)
        })
        .collect();

    tracing::debug!(rows = table.len(), "materialized paths resolved");
    Ok(table)
}

fn unresolved(set: &ValidatedSet, pos: usize, reason: impl Into<String>) -> StructuralError {
    StructuralError::UnresolvedPath {
        identifier: set.elements()[pos].identifier.clone(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::GROUP_NAME_KEY;
    use crate::{BuilderConfig, TaxonomyElement};

    fn chain(len: usize) -> Vec<TaxonomyElement> {
        let mut elements = vec![TaxonomyElement::root("n0")];
        for i in 1..len {
            elements.push(TaxonomyElement::child(format!("n{}", i), format!("n{}", i - 1)));
        }
        elements
    }

    #[test]
    fn test_children_before_parents() {
        // Resolution must not depend on parents appearing first.
        let set = ValidatedSet::assume_valid(
            vec![
                TaxonomyElement::child("C", "A"),
                TaxonomyElement::child("A", "R"),
                TaxonomyElement::root("R"),
            ],
            BuilderConfig::default(),
        );
        let table = build_materialized_path(&set).unwrap();

        assert_eq!(table["C"].path, vec!["R", "A", "C"]);
        assert_eq!(table["C"].depth, 2);
        assert_eq!(table["R"].depth, 0);
        let keys: Vec<&str> = table.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["C", "A", "R"]);
    }

    #[test]
    fn test_deep_chain() {
        let set = ValidatedSet::assume_valid(chain(1_000), BuilderConfig::default());
        let table = build_materialized_path(&set).unwrap();

        let last = &table["n999"];
        assert_eq!(last.depth, 999);
        assert_eq!(last.root(), "n0");
        assert_eq!(last.parent(), Some("n998"));
    }

    #[test]
    fn test_labels_and_full_path() {
        let set = ValidatedSet::assume_valid(
            vec![
                TaxonomyElement::root("R").with_label("Statement of financial position"),
                TaxonomyElement::child("A", "R").with_label("Assets"),
                TaxonomyElement::child("X", "A"),
            ],
            BuilderConfig::default(),
        );
        let table = build_materialized_path(&set).unwrap();

        assert_eq!(
            table["X"].full_path(),
            "Statement of financial position > Assets > X"
        );
        assert!(table["X"].has_ancestor("R"));
        assert!(!table["X"].has_ancestor("X"));
        assert_eq!(table["R"].parent(), None);
    }

    #[test]
    fn test_dangling_parent_is_unresolved() {
        let set = ValidatedSet::assume_valid(
            vec![TaxonomyElement::root("R"), TaxonomyElement::child("B", "Z")],
            BuilderConfig::default(),
        );
        let err = build_materialized_path(&set).unwrap_err();
        assert!(matches!(
            err,
            StructuralError::UnresolvedPath { ref identifier, .. } if identifier == "B"
        ));
    }

    #[test]
    fn test_cycle_is_unresolved() {
        let set = ValidatedSet::assume_valid(
            vec![
                TaxonomyElement::root("R"),
                TaxonomyElement::child("A", "B"),
                TaxonomyElement::child("B", "A"),
            ],
            BuilderConfig::default(),
        );
        let err = build_materialized_path(&set).unwrap_err();
        assert!(matches!(err, StructuralError::UnresolvedPath { .. }));
    }

    #[test]
    fn test_full_path_leads_with_group_name() {
        let set = ValidatedSet::assume_valid(
            vec![
                TaxonomyElement::root("R").with_label("Root [abstract]"),
                TaxonomyElement::child("A", "R")
                    .with_label("Assets")
                    .with_metadata(GROUP_NAME_KEY, "Statement of financial position"),
            ],
            BuilderConfig::default(),
        );
        let table = build_materialized_path(&set).unwrap();

        assert_eq!(table["R"].group, None);
        assert_eq!(table["R"].full_path(), "Root [abstract]");
        assert_eq!(
            table["A"].full_path(),
            "Statement of financial position > Root [abstract] > Assets"
        );
    }

    #[test]
    fn test_has_ancestor_tolerates_inconsistent_depth() {
        let row = MaterializedPathRow {
            identifier: "X".to_string(),
            path: vec!["R".to_string(), "X".to_string()],
            labels: vec!["R".to_string(), "X".to_string()],
            depth: 7,
            group: None,
        };

        assert!(row.has_ancestor("R"));
        assert!(row.has_ancestor("X"));
        assert!(!row.has_ancestor("Q"));
    }
}
