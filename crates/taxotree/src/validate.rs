//! Structural validation of a taxonomy row set
//!
//! Four checks run in a fixed order and the first failure is returned:
//!
//! 1. identifiers are unique
//! 2. every parent identifier resolves
//! 3. the root count matches the [`BuilderConfig`]
//! 4. the parent relation is acyclic
//!
//! A successful run yields a [`ValidatedSet`], the only input the build
//! operations accept.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::config::BuilderConfig;
use crate::element::TaxonomyElement;
use crate::error::StructuralError;

/// A record set that passed structural validation.
///
/// Holds the records in input order with an identifier index. It is
/// immutable; every build reads it and none of them change it.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSet {
    elements: Vec<TaxonomyElement>,
    index: HashMap<String, usize>,
    roots: Vec<usize>,
    config: BuilderConfig,
}

impl ValidatedSet {
    /// Wrap records without running any checks.
    ///
    /// For hosts that already validated the data elsewhere. If the records
    /// are in fact broken, the path and tree builds fail with
    /// [`StructuralError::UnresolvedPath`] instead of looping or panicking.
    /// When identifiers repeat, the first occurrence wins the index.
    pub fn assume_valid(elements: Vec<TaxonomyElement>, config: BuilderConfig) -> Self {
        let mut index = HashMap::with_capacity(elements.len());
        for (pos, element) in elements.iter().enumerate() {
            index.entry(element.identifier.clone()).or_insert(pos);
        }
        let roots = root_positions(&elements);
        Self {
            elements,
            index,
            roots,
            config,
        }
    }

    /// All records, in input order.
    pub fn elements(&self) -> &[TaxonomyElement] {
        &self.elements
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Look up a record by identifier.
    pub fn get(&self, identifier: &str) -> Option<&TaxonomyElement> {
        self.position(identifier).map(|pos| &self.elements[pos])
    }

    /// Input position of a record.
    pub fn position(&self, identifier: &str) -> Option<usize> {
        self.index.get(identifier).copied()
    }

    /// Root records, in first-encountered order.
    pub fn roots(&self) -> impl Iterator<Item = &TaxonomyElement> + '_ {
        self.roots.iter().map(|&pos| &self.elements[pos])
    }

    /// Config the set was validated against.
    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Give the records back.
    pub fn into_elements(self) -> Vec<TaxonomyElement> {
        self.elements
    }

    pub(crate) fn root_positions(&self) -> &[usize] {
        &self.roots
    }

    /// Input position of the parent of the record at `pos`.
    ///
    /// `Ok(None)` for roots, `Err(parent_id)` when the parent is unknown.
    pub(crate) fn parent_position(&self, pos: usize) -> Result<Option<usize>, &str> {
        match self.elements[pos].parent.as_deref() {
            None => Ok(None),
            Some(parent) => self.position(parent).map(Some).ok_or(parent),
        }
    }
}

fn root_positions(elements: &[TaxonomyElement]) -> Vec<usize> {
    elements
        .iter()
        .enumerate()
        .filter(|(_, element)| element.is_root())
        .map(|(pos, _)| pos)
        .collect()
}

/// Run all structural checks over `elements`.
pub fn validate(
    elements: Vec<TaxonomyElement>,
    config: &BuilderConfig,
) -> Result<ValidatedSet, StructuralError> {
    let mut index = HashMap::with_capacity(elements.len());
    for (pos, element) in elements.iter().enumerate() {
        match index.entry(element.identifier.clone()) {
            Entry::Occupied(_) => {
                return Err(StructuralError::DuplicateIdentifier {
                    identifier: element.identifier.clone(),
                });
            }
            Entry::Vacant(slot) => {
                slot.insert(pos);
            }
        }
    }

    for element in &elements {
        if let Some(parent) = &element.parent {
            if !index.contains_key(parent) {
                return Err(StructuralError::DanglingParentReference {
                    child: element.identifier.clone(),
                    parent: parent.clone(),
                });
            }
        }
    }

    let roots = root_positions(&elements);
    if !config.accepts_root_count(roots.len()) {
        return Err(StructuralError::RootCountMismatch {
            expected: config.expected_root_count,
            roots: roots
                .iter()
                .map(|&pos| elements[pos].identifier.clone())
                .collect(),
        });
    }

    let set = ValidatedSet {
        elements,
        index,
        roots,
        config: *config,
    };
    check_acyclic(&set)?;

    tracing::debug!(
        elements = set.len(),
        roots = set.roots.len(),
        "taxonomy row set validated"
    );
    Ok(set)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnPath,
    Done,
}

/// Walk every ancestor chain once, colouring nodes as they finish.
///
/// A chain that reaches a node already on the current walk has found a
/// cycle; one that reaches a finished node stops there.
fn check_acyclic(set: &ValidatedSet) -> Result<(), StructuralError> {
    let mut marks = vec![Mark::Unvisited; set.len()];
    let mut walk: Vec<usize> = Vec::new();

    for start in 0..set.len() {
        if marks[start] != Mark::Unvisited {
            continue;
        }

        walk.clear();
        let mut current = Some(start);
        while let Some(pos) = current {
            match marks[pos] {
                Mark::Done => break,
                Mark::OnPath => {
                    let first = walk.iter().position(|&p| p == pos).unwrap_or(0);
                    let members = walk[first..]
                        .iter()
                        .map(|&p| set.elements[p].identifier.clone())
                        .collect();
                    return Err(StructuralError::CycleDetected { members });
                }
                Mark::Unvisited => {
                    marks[pos] = Mark::OnPath;
                    walk.push(pos);
                    // Parents were resolved by the dangling-reference check.
                    current = set.parent_position(pos).ok().flatten();
                }
            }
        }

        for &pos in &walk {
            marks[pos] = Mark::Done;
        }
    }

    Ok(())
}
