//! QA checks and run summary
//!
//! After a hierarchy is built, a fixed set of named checks runs over the
//! prepared rows and the materialized paths. A [`QaPolicy`] decides which
//! checks are critical. A failing critical check stops the run unless
//! the policy forces it through, in which case the failures are recorded
//! as anomalies in the [`RunSummary`].

use std::collections::HashSet;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::QaError;
use crate::normalize::PreparedRow;
use crate::path::PathTable;

/// A named QA check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QaCheck {
    /// Every row carries a group code and name
    AllHaveGroupInfo,

    /// Indent levels are integers (always true here; kept so reports line
    /// up with the historical check list)
    IndentMatchesInt,

    /// Only abstract rows may have an empty label
    NoEmptyLabelsUnlessAbstract,

    /// No two materialized paths render to the same full path (group name
    /// first, then labels from the root)
    UniqueFullPath,
}

impl QaCheck {
    /// Every check, in reporting order.
    pub const ALL: [QaCheck; 4] = [
        QaCheck::AllHaveGroupInfo,
        QaCheck::IndentMatchesInt,
        QaCheck::NoEmptyLabelsUnlessAbstract,
        QaCheck::UniqueFullPath,
    ];

    /// Snake-case name used in reports.
    pub fn name(&self) -> &'static str {
        match self {
            QaCheck::AllHaveGroupInfo => "all_have_group_info",
            QaCheck::IndentMatchesInt => "indent_matches_int",
            QaCheck::NoEmptyLabelsUnlessAbstract => "no_empty_labels_unless_abstract",
            QaCheck::UniqueFullPath => "unique_full_path",
        }
    }
}

impl fmt::Display for QaCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Pass/fail result of each check, in [`QaCheck::ALL`] order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaReport {
    results: IndexMap<QaCheck, bool>,
}

impl QaReport {
    /// Run every check.
    pub fn run(rows: &[PreparedRow], paths: &PathTable) -> Self {
        let results = QaCheck::ALL
            .iter()
            .map(|&check| {
                let passed = match check {
                    QaCheck::AllHaveGroupInfo => rows.iter().all(|r| r.group.is_some()),
                    QaCheck::IndentMatchesInt => true,
                    QaCheck::NoEmptyLabelsUnlessAbstract => rows
                        .iter()
                        .filter(|r| !r.is_abstract())
                        .all(|r| !r.label.is_empty()),
                    QaCheck::UniqueFullPath => {
                        let mut seen = HashSet::with_capacity(paths.len());
                        paths.values().all(|row| seen.insert(row.full_path()))
                    }
                };
                (check, passed)
            })
            .collect();

        Self { results }
    }

    /// Result of one check.
    pub fn passed(&self, check: QaCheck) -> bool {
        self.results.get(&check).copied().unwrap_or(false)
    }

    /// Checks that failed, in reporting order.
    pub fn failed(&self) -> impl Iterator<Item = QaCheck> + '_ {
        self.results
            .iter()
            .filter(|(_, passed)| !**passed)
            .map(|(check, _)| *check)
    }

    /// Check if every check passed.
    pub fn all_passed(&self) -> bool {
        self.results.values().all(|passed| *passed)
    }

    /// Results keyed by check name.
    pub fn by_name(&self) -> IndexMap<String, bool> {
        self.results
            .iter()
            .map(|(check, passed)| (check.name().to_string(), *passed))
            .collect()
    }
}

/// Which checks are critical and whether failures may be forced through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QaPolicy {
    /// Checks whose failure stops the run
    pub critical_checks: Vec<QaCheck>,

    /// Continue despite failed critical checks
    pub force: bool,
}

impl Default for QaPolicy {
    fn default() -> Self {
        Self {
            critical_checks: QaCheck::ALL.to_vec(),
            force: false,
        }
    }
}

impl QaPolicy {
    /// Critical checks that failed in `report`.
    pub fn failed_critical(&self, report: &QaReport) -> Vec<QaCheck> {
        report
            .failed()
            .filter(|check| self.critical_checks.contains(check))
            .collect()
    }
}

/// Row counts at each stage of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RowCounts {
    /// Rows extracted from the sheet
    pub raw_extract: usize,
    /// Rows after group headers were filled
    pub after_group_headers: usize,
    /// Rows after cleaning
    pub after_cleaning: usize,
    /// Sheet rows placed in the validated hierarchy; a synthetic root is
    /// not counted
    pub after_hierarchy: usize,
    /// Rows in the materialized-path table, synthetic root included
    pub materialized_path: usize,
}

/// What happened in one run, ready for a host to write out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Caller-supplied run identifier
    pub run_id: String,

    /// Whether failed critical checks were forced through
    pub force_override: bool,

    /// Row counts per stage
    pub row_counts: RowCounts,

    /// Check name to pass/fail
    pub qa_results: IndexMap<String, bool>,

    /// Notes about anything unusual in the run
    pub anomalies: Vec<String>,
}

impl RunSummary {
    /// Summarize a run.
    pub fn new(run_id: impl Into<String>, row_counts: RowCounts, report: &QaReport, force: bool) -> Self {
        Self {
            run_id: run_id.into(),
            force_override: force,
            row_counts,
            qa_results: report.by_name(),
            anomalies: Vec::new(),
        }
    }

    /// Apply `policy` to the report this summary was built from.
    ///
    /// Failed critical checks stop the run unless forced; forced failures
    /// are recorded as anomalies.
    pub fn enforce(mut self, report: &QaReport, policy: &QaPolicy) -> Result<Self, QaError> {
        let failed = policy.failed_critical(report);
        if failed.is_empty() {
            tracing::info!(run_id = %self.run_id, "all critical QA checks passed");
            return Ok(self);
        }

        let checks: Vec<String> = failed.iter().map(|c| c.name().to_string()).collect();
        if !policy.force {
            tracing::error!(run_id = %self.run_id, failed = ?checks, "critical QA checks failed");
            return Err(QaError::CriticalChecksFailed {
                checks,
                summary: Box::new(self),
            });
        }

        tracing::warn!(
            run_id = %self.run_id,
            failed = ?checks,
            "force override enabled, continuing despite failed QA checks"
        );
        self.anomalies
            .extend(checks.into_iter().map(|name| format!("{} failed (forced)", name)));
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{prepare, IndentedRow};

    fn report_with(failed: &[QaCheck]) -> QaReport {
        QaReport {
            results: QaCheck::ALL
                .iter()
                .map(|c| (*c, !failed.contains(c)))
                .collect(),
        }
    }

    #[test]
    fn test_check_names_match_serde() {
        for check in QaCheck::ALL {
            let json = serde_json::to_string(&check).unwrap();
            assert_eq!(json, format!("\"{}\"", check.name()));
        }
    }

    #[test]
    fn test_missing_group_and_empty_label() {
        let prepared = prepare(vec![
            IndentedRow::new(2, "A", "", 0).with_type("text"),
            IndentedRow::new(3, "B", "[abstract]", 0),
        ]);
        let report = QaReport::run(&prepared.rows, &PathTable::new());

        assert!(!report.passed(QaCheck::AllHaveGroupInfo));
        assert!(!report.passed(QaCheck::NoEmptyLabelsUnlessAbstract));
        assert!(report.passed(QaCheck::UniqueFullPath));
        assert_eq!(
            report.failed().collect::<Vec<_>>(),
            vec![QaCheck::AllHaveGroupInfo, QaCheck::NoEmptyLabelsUnlessAbstract]
        );
    }

    #[test]
    fn test_non_critical_failure_passes_gate() {
        let report = report_with(&[QaCheck::UniqueFullPath]);
        let policy = QaPolicy {
            critical_checks: vec![QaCheck::AllHaveGroupInfo],
            force: false,
        };
        let summary = RunSummary::new("run", RowCounts::default(), &report, false)
            .enforce(&report, &policy)
            .unwrap();

        assert!(summary.anomalies.is_empty());
        assert!(!summary.qa_results["unique_full_path"]);
    }

    #[test]
    fn test_critical_failure_stops_run() {
        let report = report_with(&[QaCheck::UniqueFullPath]);
        let err = RunSummary::new("run", RowCounts::default(), &report, false)
            .enforce(&report, &QaPolicy::default())
            .unwrap_err();

        let QaError::CriticalChecksFailed { checks, summary } = err;
        assert_eq!(checks, vec!["unique_full_path".to_string()]);
        assert_eq!(summary.run_id, "run");
    }

    #[test]
    fn test_force_records_anomalies() {
        let report = report_with(&[QaCheck::AllHaveGroupInfo]);
        let policy = QaPolicy {
            force: true,
            ..Default::default()
        };
        let summary = RunSummary::new("run", RowCounts::default(), &report, true)
            .enforce(&report, &policy)
            .unwrap();

        assert!(summary.force_override);
        assert_eq!(summary.anomalies, vec!["all_have_group_info failed (forced)".to_string()]);
    }
}
