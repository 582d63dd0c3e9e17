//! Result of a `generate` or `clean` run.

use apitestgen_core::{EndpointId, FileFailure, RunWarning};
use serde::Serialize;
use std::path::PathBuf;

/// What a run did (or, on a dry run, would do). Paths are relative to the
/// repository root.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub run_id: String,
    pub dry_run: bool,
    pub created: Vec<PathBuf>,
    pub updated: Vec<PathBuf>,
    pub deleted: Vec<PathBuf>,
    pub skipped: Vec<EndpointId>,
    pub warnings: Vec<RunWarning>,
    pub failures: Vec<FileFailure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_path: Option<PathBuf>,
}

impl RunSummary {
    /// Some files failed while the rest were processed.
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn changed_files(&self) -> usize {
        self.created.len() + self.updated.len() + self.deleted.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_only_with_failures() {
        let mut summary = RunSummary::default();
        assert!(!summary.is_partial());

        summary.failures.push(FileFailure {
            path: PathBuf::from("tests/api/test_a.py"),
            action: "create".to_string(),
            error: "permission denied".to_string(),
        });
        assert!(summary.is_partial());
    }

    #[test]
    fn test_serializes_without_empty_report_path() {
        let json = serde_json::to_value(RunSummary::default()).unwrap();
        assert!(json.get("report_path").is_none());
        assert_eq!(json["dry_run"], false);
    }
}
