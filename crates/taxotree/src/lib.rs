//! # Taxotree
//!
//! Hierarchy building for accounting standards taxonomies.
//!
//! Taxotree takes the flat rows of a taxonomy (each an identifier plus an
//! optional parent identifier) and derives three representations from them:
//! an adjacency list, a materialized-path table, and a nested tree. The
//! structural invariants are checked up front so that no output is ever
//! produced from a broken row set.
//!
//! ## Architecture
//!
//! ```text
//! IndentedRow → [prepare] → PreparedRow → [normalize] → TaxonomyElement
//!                                                            │
//!                                                   [HierarchyBuilder::validate]
//!                                                            │
//!                                                       ValidatedSet
//!                                   ┌────────────────────────┼──────────────────┐
//!                              adjacency list        materialized paths     nested tree
//! ```
//!
//! - **Normalizer**: turns indentation-coded spreadsheet rows into records
//!   with explicit parents
//! - **HierarchyBuilder**: validates and builds the three artifacts
//! - **QA**: named checks over the results, summarized per run
//!
//! Reading the spreadsheet and writing the artifacts are left to the host;
//! every type here is plain in-memory data with `serde` derives.
//!
//! ## Example
//!
//! ```
//! use taxotree::{HierarchyBuilder, TaxonomyElement};
//!
//! let builder = HierarchyBuilder::new();
//! let hierarchy = builder
//!     .build(vec![
//!         TaxonomyElement::root("R"),
//!         TaxonomyElement::child("A", "R"),
//!         TaxonomyElement::child("C", "A"),
//!     ])
//!     .unwrap();
//!
//! assert_eq!(hierarchy.adjacency.len(), 2);
//! assert_eq!(hierarchy.paths["C"].depth, 2);
//! assert_eq!(hierarchy.tree.node_count(), 3);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adjacency;
pub mod builder;
pub mod config;
pub mod element;
pub mod error;
pub mod normalize;
pub mod path;
pub mod pipeline;
pub mod qa;
pub mod tree;
pub mod validate;

// Re-export main types
pub use adjacency::AdjacencyRow;
pub use builder::{Hierarchy, HierarchyBuilder};
pub use config::BuilderConfig;
pub use element::{Metadata, TaxonomyElement};
pub use error::{NormalizeError, QaError, Result, StructuralError, TaxonomyError};
pub use normalize::{
    normalize_indented, prepare, GroupHeader, IdentifierScheme, IndentedRow, NormalizeOptions,
    PreparedRow,
    PreparedRows, SyntheticRoot,
};
pub use path::{MaterializedPathRow, PathTable};
pub use pipeline::{Pipeline, PipelineConfig, PipelineOutput};
pub use qa::{QaCheck, QaPolicy, QaReport, RowCounts, RunSummary};
pub use tree::{TreeNode, TreeOutput};
pub use validate::ValidatedSet;

/// Taxotree version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
