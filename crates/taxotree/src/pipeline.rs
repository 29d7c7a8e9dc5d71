//! End-to-end transform from sheet rows to hierarchy plus run summary

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::builder::{Hierarchy, HierarchyBuilder};
use crate::config::BuilderConfig;
use crate::error::Result;
use crate::normalize::{self, IndentedRow, NormalizeOptions};
use crate::qa::{QaPolicy, QaReport, RowCounts, RunSummary};

/// Everything a [`Pipeline`] needs, in one deserializable struct.
///
/// ```yaml
/// builder:
///   expected_root_count: 1
/// normalize:
///   max_levels: 6
///   synthetic_root:
///     identifier: ifrs
///     label: IFRS Taxonomy
/// qa:
///   critical_checks: [unique_full_path]
///   force: false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Root-count expectation
    pub builder: BuilderConfig,
    /// Indent normalization
    pub normalize: NormalizeOptions,
    /// QA gate
    pub qa: QaPolicy,
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutput {
    /// The three hierarchy artifacts
    pub hierarchy: Hierarchy,
    /// Counts, QA results and anomalies of the run
    pub summary: RunSummary,
}

/// Runs prepare, normalize, build and QA in sequence.
///
/// Any failure stops the run and no artifacts are returned. A failed QA gate
/// still carries its [`RunSummary`] inside the error.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
    builder: HierarchyBuilder,
}

impl Pipeline {
    /// Create a pipeline.
    pub fn new(config: PipelineConfig) -> Self {
        let builder = HierarchyBuilder::with_config(config.builder);
        Self { config, builder }
    }

    /// The pipeline's config.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Transform `rows` for the run named `run_id`.
    #[instrument(skip(self, rows))]
    pub fn run(
        &self,
        run_id: &str,
        rows: impl IntoIterator<Item = IndentedRow>,
    ) -> Result<PipelineOutput> {
        let prepared = normalize::prepare(rows);
        let elements = normalize::normalize_indented(&prepared.rows, &self.config.normalize)?;
        let hierarchy = self.builder.build(elements)?;

        let synthetic = usize::from(self.config.normalize.synthetic_root.is_some());
        let row_counts = RowCounts {
            raw_extract: prepared.raw_count,
            after_group_headers: prepared.grouped_count,
            after_cleaning: prepared.rows.len(),
            after_hierarchy: hierarchy.paths.len().saturating_sub(synthetic),
            materialized_path: hierarchy.paths.len(),
        };
        let report = QaReport::run(&prepared.rows, &hierarchy.paths);
        let summary = RunSummary::new(run_id, row_counts, &report, self.config.qa.force)
            .enforce(&report, &self.config.qa)?;

        tracing::info!(
            raw = row_counts.raw_extract,
            cleaned = row_counts.after_cleaning,
            elements = row_counts.after_hierarchy,
            "taxonomy pipeline finished"
        );
        Ok(PipelineOutput { hierarchy, summary })
    }
}
