//! Normalization of indentation-coded taxonomy rows
//!
//! The taxonomy spreadsheet has no parent column. Hierarchy is encoded by
//! the indentation of each row's label, and groups of concepts are
//! introduced by header rows whose concept name reads `[NNNNNN] Name`.
//! This module turns those rows into [`TaxonomyElement`] records with
//! explicit parents.
//!
//! Two steps:
//!
//! - [`prepare`] forward-fills group headers, cleans labels, infers the
//!   `abstract` type, and drops rows that still have no type
//! - [`normalize_indented`] derives each row's parent from indentation
//!
//! The same concept is listed under every presentation group that uses it,
//! so by default identifiers are scoped by group code (see
//! [`IdentifierScheme`]).

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::element::{Metadata, TaxonomyElement, GROUP_NAME_KEY, LABEL_KEY};
use crate::error::NormalizeError;

/// Group header concept names: six-digit code in brackets, then the name.
static GROUP_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[(\d{6})\]\s*(.*)").unwrap());

/// Marker in labels of abstract concepts.
const ABSTRACT_MARKER: &str = "[abstract]";

/// Type assigned to untyped rows carrying [`ABSTRACT_MARKER`].
pub const ABSTRACT_TYPE: &str = "abstract";

/// Metadata keys written by [`normalize_indented`].
pub mod keys {
    /// Element type (`abstract`, `X instant, debit`, ...)
    pub const TYPE: &str = "type";
    /// Six-digit group code
    pub const GROUP_CODE: &str = "group_code";
    /// Group name
    pub const GROUP_NAME: &str = crate::element::GROUP_NAME_KEY;
    /// Concept name as extracted, before any group scoping
    pub const CONCEPT_NAME: &str = "concept_name";
    /// Spreadsheet row number
    pub const SOURCE_ROW: &str = "source_row";
    /// Label exactly as extracted
    pub const PREFERRED_LABEL: &str = "preferred_label";
    /// Indentation level
    pub const INDENT: &str = "indent";
}

/// A row as read from the taxonomy sheet.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IndentedRow {
    /// Spreadsheet row number
    pub source_row: usize,

    /// Concept name, the basis of the identifier
    pub concept_name: Option<String>,

    /// Preferred label as written in the sheet
    pub preferred_label: Option<String>,

    /// Indentation level of the label cell
    pub indent: usize,

    /// Element type column
    pub element_type: Option<String>,

    /// Optional columns (standard label, documentation label, references...)
    #[serde(default)]
    pub extra: Metadata,
}

impl IndentedRow {
    /// Create a row with a concept name, label and indent.
    pub fn new(
        source_row: usize,
        concept_name: impl Into<String>,
        label: impl Into<String>,
        indent: usize,
    ) -> Self {
        Self {
            source_row,
            concept_name: Some(concept_name.into()),
            preferred_label: Some(label.into()),
            indent,
            ..Default::default()
        }
    }

    /// Set the type column.
    pub fn with_type(mut self, element_type: impl Into<String>) -> Self {
        self.element_type = Some(element_type.into());
        self
    }

    /// Add an optional column.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Group a row belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupHeader {
    /// Six-digit group code
    pub code: String,
    /// Group name (may be empty)
    pub name: String,
}

impl GroupHeader {
    /// Parse a `[NNNNNN] Name` concept name.
    pub fn parse(concept_name: &str) -> Option<Self> {
        let caps = GROUP_HEADER_RE.captures(concept_name)?;
        Some(Self {
            code: caps[1].to_string(),
            name: caps[2].to_string(),
        })
    }
}

/// A row after cleaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreparedRow {
    /// The row as extracted
    pub row: IndentedRow,

    /// Trimmed preferred label (empty when there was none)
    pub label: String,

    /// Type, with `abstract` filled in where inferred
    pub element_type: String,

    /// Group carried forward from the nearest header above
    pub group: Option<GroupHeader>,
}

impl PreparedRow {
    /// Check if this row is an abstract concept.
    pub fn is_abstract(&self) -> bool {
        self.element_type == ABSTRACT_TYPE
    }
}

/// Output of [`prepare`] with the row counts of each stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreparedRows {
    /// Rows that survived cleaning, in sheet order
    pub rows: Vec<PreparedRow>,
    /// Rows handed in
    pub raw_count: usize,
    /// Rows after group headers were filled (same as raw)
    pub grouped_count: usize,
}

/// Fill groups, clean labels, infer abstract types, drop untyped rows.
///
/// Rows above the first group header carry no group. A row without a type
/// whose label contains `[abstract]` becomes `abstract`; any other row
/// without a type is dropped, which removes the header rows themselves.
pub fn prepare(rows: impl IntoIterator<Item = IndentedRow>) -> PreparedRows {
    let mut current_group: Option<GroupHeader> = None;
    let mut raw_count = 0;
    let mut kept = Vec::new();

    for row in rows {
        raw_count += 1;

        if let Some(header) = row.concept_name.as_deref().and_then(GroupHeader::parse) {
            current_group = Some(header);
        }

        let label = row
            .preferred_label
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string();

        let element_type = match row.element_type.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ if label.contains(ABSTRACT_MARKER) => ABSTRACT_TYPE.to_string(),
            _ => continue,
        };

        kept.push(PreparedRow {
            row,
            label,
            element_type,
            group: current_group.clone(),
        });
    }

    tracing::debug!(raw = raw_count, kept = kept.len(), "taxonomy rows prepared");
    PreparedRows {
        rows: kept,
        raw_count,
        grouped_count: raw_count,
    }
}

/// A root to place above all top-level rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntheticRoot {
    /// Identifier of the root record
    pub identifier: String,
    /// Label of the root record
    pub label: String,
}

/// How [`normalize_indented`] turns a concept name into an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierScheme {
    /// `{group_code}/{concept_name}` for grouped rows, the bare concept
    /// name otherwise
    #[default]
    GroupScoped,

    /// The concept name as is; a concept listed in two groups is then a
    /// duplicate identifier
    ConceptName,
}

impl IdentifierScheme {
    /// Identifier for `concept_name` found under `group`.
    pub fn identifier(&self, concept_name: &str, group: Option<&GroupHeader>) -> String {
        match (self, group) {
            (IdentifierScheme::GroupScoped, Some(group)) => {
                format!("{}/{}", group.code, concept_name)
            }
            _ => concept_name.to_string(),
        }
    }
}

/// Options for [`normalize_indented`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeOptions {
    /// Deepest level expected; deeper rows are kept but logged
    pub max_levels: usize,

    /// Parent every top-level row under this root
    pub synthetic_root: Option<SyntheticRoot>,

    /// Identifier construction
    pub identifiers: IdentifierScheme,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            max_levels: 5,
            synthetic_root: None,
            identifiers: IdentifierScheme::default(),
        }
    }
}

impl NormalizeOptions {
    /// Options that add a synthetic root.
    pub fn with_synthetic_root(identifier: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            synthetic_root: Some(SyntheticRoot {
                identifier: identifier.into(),
                label: label.into(),
            }),
            ..Default::default()
        }
    }
}

/// Derive parents from indentation.
///
/// A row's parent is the nearest preceding row with a smaller indent. Rows
/// with nothing above them are roots, or children of the synthetic root
/// when one is configured. Identifiers follow
/// [`NormalizeOptions::identifiers`]; the raw concept name is kept under
/// [`keys::CONCEPT_NAME`].
pub fn normalize_indented(
    rows: &[PreparedRow],
    options: &NormalizeOptions,
) -> Result<Vec<TaxonomyElement>, NormalizeError> {
    let mut elements = Vec::with_capacity(rows.len() + 1);
    let top_parent = options.synthetic_root.as_ref().map(|root| {
        elements.push(TaxonomyElement::root(root.identifier.clone()).with_label(root.label.clone()));
        root.identifier.clone()
    });

    // (indent, identifier) of the open ancestors
    let mut stack: Vec<(usize, String)> = Vec::new();
    let mut deepest = 0;

    for prepared in rows {
        let concept_name = prepared
            .row
            .concept_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or(NormalizeError::MissingIdentifier {
                row: prepared.row.source_row,
            })?;
        let identifier = options
            .identifiers
            .identifier(concept_name, prepared.group.as_ref());
        let indent = prepared.row.indent;

        while stack.last().is_some_and(|(level, _)| *level >= indent) {
            stack.pop();
        }
        let parent = stack
            .last()
            .map(|(_, id)| id.clone())
            .or_else(|| top_parent.clone());

        deepest = deepest.max(stack.len() + 1);
        elements.push(TaxonomyElement {
            identifier: identifier.clone(),
            parent,
            metadata: row_metadata(prepared, concept_name),
        });
        stack.push((indent, identifier));
    }

    if deepest > options.max_levels {
        tracing::warn!(
            depth = deepest,
            max_levels = options.max_levels,
            "taxonomy is deeper than the configured maximum"
        );
    }

    Ok(elements)
}

fn row_metadata(prepared: &PreparedRow, concept_name: &str) -> Metadata {
    let mut metadata = Metadata::new();
    metadata.insert(LABEL_KEY.to_string(), prepared.label.clone().into());
    metadata.insert(keys::TYPE.to_string(), prepared.element_type.clone().into());
    metadata.insert(keys::CONCEPT_NAME.to_string(), concept_name.into());
    if let Some(group) = &prepared.group {
        metadata.insert(keys::GROUP_CODE.to_string(), group.code.clone().into());
        metadata.insert(GROUP_NAME_KEY.to_string(), group.name.clone().into());
    }
    metadata.insert(keys::SOURCE_ROW.to_string(), prepared.row.source_row.into());
    metadata.insert(keys::INDENT.to_string(), prepared.row.indent.into());
    if let Some(label) = &prepared.row.preferred_label {
        metadata.insert(keys::PREFERRED_LABEL.to_string(), label.clone().into());
    }
    for (key, value) in &prepared.row.extra {
        metadata.entry(key.clone()).or_insert_with(|| value.clone());
    }
    metadata
}
