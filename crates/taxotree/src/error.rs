//! Error types for hierarchy building

use thiserror::Error;

/// A violation of the parent/child integrity of a taxonomy row set.
///
/// Validation stops at the first failing check, so a row set with several
/// problems reports only one of them. The checks run in the order the
/// variants are declared here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralError {
    /// Two or more records share an identifier
    #[error("Duplicate identifier: '{identifier}'")]
    DuplicateIdentifier {
        /// The repeated identifier
        identifier: String,
    },

    /// A record names a parent that is not in the set
    #[error("Dangling parent reference: '{child}' points to missing parent '{parent}'")]
    DanglingParentReference {
        /// The record holding the reference
        child: String,
        /// The parent identifier that could not be found
        parent: String,
    },

    /// The number of roots differs from the configured expectation
    #[error(
        "Root count mismatch: expected {expected}, found {} [{}]",
        .roots.len(),
        .roots.join(", ")
    )]
    RootCountMismatch {
        /// Configured root count
        expected: usize,
        /// Observed root identifiers, in input order
        roots: Vec<String>,
    },

    /// The parent relation loops back on itself
    #[error("Cycle detected: {}", .members.join(" -> "))]
    CycleDetected {
        /// Identifiers on the cycle, in parent-walk order
        members: Vec<String>,
    },

    /// Path or tree resolution hit data that never went through validation
    #[error("Unresolved path for '{identifier}': {reason}")]
    UnresolvedPath {
        /// The element whose ancestry could not be resolved
        identifier: String,
        /// What went wrong during the walk
        reason: String,
    },
}

/// Errors from turning indented spreadsheet rows into records.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    /// A row that survived cleaning has no concept name to use as identifier
    #[error("Row {row} has no concept name")]
    MissingIdentifier {
        /// Source row number
        row: usize,
    },
}

/// Errors from the QA gate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QaError {
    /// Critical checks failed and no force override was given
    #[error("Critical QA checks failed: {}", .checks.join(", "))]
    CriticalChecksFailed {
        /// Names of the failed critical checks
        checks: Vec<String>,
        /// Summary of the run that was stopped
        summary: Box<crate::qa::RunSummary>,
    },
}

/// Main error type for taxotree operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TaxonomyError {
    /// Structural validation or build failure
    #[error(transparent)]
    Structural(#[from] StructuralError),

    /// Row normalization failure
    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    /// QA gate failure
    #[error(transparent)]
    Qa(#[from] QaError),
}

/// Result type alias for taxotree operations
pub type Result<T> = std::result::Result<T, TaxonomyError>;
