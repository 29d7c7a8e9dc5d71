//! Hierarchy builder
//!
//! [`HierarchyBuilder`] is the entry point for turning flat records into
//! the three hierarchy artifacts. It holds nothing but its config, so one
//! builder can be reused across runs and every run starts from scratch.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::adjacency::{self, AdjacencyRow};
use crate::config::BuilderConfig;
use crate::element::TaxonomyElement;
use crate::error::StructuralError;
use crate::path::{self, PathTable};
use crate::tree::{self, TreeOutput};
use crate::validate::{self, ValidatedSet};

/// The three artifacts of one build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hierarchy {
    /// Parent/child edges in input order
    pub adjacency: Vec<AdjacencyRow>,

    /// Materialized paths keyed by identifier, in input order
    pub paths: PathTable,

    /// Nested tree (or forest)
    pub tree: TreeOutput,
}

/// Validates taxonomy records and derives the hierarchy artifacts.
///
/// The three builds each read only the [`ValidatedSet`]; none depends on
/// another's output.
///
/// # Example
///
/// ```
/// use taxotree::{AdjacencyRow, HierarchyBuilder, TaxonomyElement};
///
/// let builder = HierarchyBuilder::new();
/// let set = builder
///     .validate(vec![
///         TaxonomyElement::root("R"),
///         TaxonomyElement::child("A", "R"),
///     ])
///     .unwrap();
///
/// assert_eq!(builder.build_adjacency(&set), vec![AdjacencyRow::new("R", "A")]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct HierarchyBuilder {
    config: BuilderConfig,
}

impl HierarchyBuilder {
    /// Create a builder requiring a single root.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder with a custom config.
    pub fn with_config(config: BuilderConfig) -> Self {
        Self { config }
    }

    /// The builder's config.
    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Check the structural invariants of `records`.
    ///
    /// Checks run in order (duplicates, dangling parents, root count,
    /// cycles) and the first failure is returned.
    #[instrument(skip_all)]
    pub fn validate(
        &self,
        records: impl IntoIterator<Item = TaxonomyElement>,
    ) -> Result<ValidatedSet, StructuralError> {
        let records: Vec<TaxonomyElement> = records.into_iter().collect();
        validate::validate(records, &self.config).inspect_err(|err| {
            tracing::warn!(error = %err, "taxonomy validation failed");
        })
    }

    /// One edge per record with a parent, in input order.
    pub fn build_adjacency(&self, set: &ValidatedSet) -> Vec<AdjacencyRow> {
        adjacency::build_adjacency(set)
    }

    /// Root-to-element path of every record.
    pub fn build_materialized_path(&self, set: &ValidatedSet) -> Result<PathTable, StructuralError> {
        path::build_materialized_path(set)
    }

    /// Nested tree, children in input order.
    ///
    /// The shape follows the config the set was validated against, not the
    /// builder's own.
    pub fn build_tree(&self, set: &ValidatedSet) -> Result<TreeOutput, StructuralError> {
        tree::build_tree(set)
    }

    /// Validate and run all three builds.
    #[instrument(skip_all)]
    pub fn build(
        &self,
        records: impl IntoIterator<Item = TaxonomyElement>,
    ) -> Result<Hierarchy, StructuralError> {
        let set = self.validate(records)?;
        let hierarchy = self.build_validated(&set)?;
        tracing::info!(
            elements = set.len(),
            edges = hierarchy.adjacency.len(),
            roots = hierarchy.tree.roots().len(),
            "taxonomy hierarchy built"
        );
        Ok(hierarchy)
    }

    /// Run all three builds over an already validated set.
    pub fn build_validated(&self, set: &ValidatedSet) -> Result<Hierarchy, StructuralError> {
        Ok(Hierarchy {
            adjacency: self.build_adjacency(set),
            paths: self.build_materialized_path(set)?,
            tree: self.build_tree(set)?,
        })
    }
}
