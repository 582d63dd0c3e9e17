//! Coverage report persistence.

#![allow(clippy::result_large_err)]

use crate::errors::{io_error_at, serialization_error, Result};
use crate::fs::atomic::atomic_write;
use apitestgen_core::CoverageReport;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const REPORT_FILE_NAME: &str = "report.json";

/// Relative location of the report for a test dir.
pub fn report_path(test_dir: &Path) -> PathBuf {
    test_dir.join(REPORT_FILE_NAME)
}

/// Write the report as pretty JSON; returns its repository-relative path.
///
/// # Errors
///
/// Returns `Serialization` or `Io` on failure.
pub fn write_report(repo_root: &Path, test_dir: &Path, report: &CoverageReport) -> Result<PathBuf> {
    let rel = report_path(test_dir);
    let mut json =
        serde_json::to_string_pretty(report).map_err(|e| serialization_error("write_report", e))?;
    json.push('\n');
    atomic_write(&repo_root.join(&rel), json.as_bytes())?;
    tracing::debug!(path = %rel.display(), "coverage report written");
    Ok(rel)
}

/// Remove the report; `Ok(false)` when there was none.
///
/// # Errors
///
/// Returns `Io` when the file exists but cannot be removed.
pub fn remove_report(repo_root: &Path, test_dir: &Path) -> Result<bool> {
    let path = repo_root.join(report_path(test_dir));
    match fs::remove_file(&path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(io_error_at("remove_report", &path, e)),
    }
}
