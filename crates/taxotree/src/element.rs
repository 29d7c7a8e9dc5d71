//! Input records

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Opaque passthrough fields carried alongside a record.
///
/// Insertion order is kept so the fields come out in the order the
/// extractor put them in.
pub type Metadata = IndexMap<String, serde_json::Value>;

/// Metadata key holding the human-readable label.
pub const LABEL_KEY: &str = "label";

/// Metadata key holding the name of the presentation group.
pub const GROUP_NAME_KEY: &str = "group_name";

/// One row of the taxonomy as handed over by the extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxonomyElement {
    /// Unique identifier
    pub identifier: String,

    /// Identifier of the parent, `None` for a root
    #[serde(default)]
    pub parent: Option<String>,

    /// Passthrough fields not interpreted by the builder
    #[serde(default)]
    pub metadata: Metadata,
}

impl TaxonomyElement {
    /// Create a record with an explicit parent.
    pub fn new(identifier: impl Into<String>, parent: Option<String>) -> Self {
        Self {
            identifier: identifier.into(),
            parent,
            metadata: Metadata::new(),
        }
    }

    /// Create a root record.
    pub fn root(identifier: impl Into<String>) -> Self {
        Self::new(identifier, None)
    }

    /// Create a record under `parent`.
    pub fn child(identifier: impl Into<String>, parent: impl Into<String>) -> Self {
        Self::new(identifier, Some(parent.into()))
    }

    /// Add a metadata field.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Set the label field.
    pub fn with_label(self, label: impl Into<String>) -> Self {
        self.with_metadata(LABEL_KEY, label.into())
    }

    /// The label field, if present and a string.
    pub fn label(&self) -> Option<&str> {
        self.metadata.get(LABEL_KEY).and_then(|v| v.as_str())
    }

    /// The label, or the identifier when there is none.
    pub fn display_label(&self) -> &str {
        self.label().unwrap_or(&self.identifier)
    }

    /// The group name field, if present and not blank.
    pub fn group_name(&self) -> Option<&str> {
        self.metadata
            .get(GROUP_NAME_KEY)
            .and_then(|v| v.as_str())
            .filter(|name| !name.trim().is_empty())
    }

    /// Check if this record has no parent.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}
