//! `diff`: classify endpoints against the repository without writing.

#![allow(clippy::result_large_err)]

use crate::commands::options::{resolve_config, ConfigOverrides};
use apitestgen_core::diff::{render_human_summary, DiffOutcome, DiffResult};
use apitestgen_core::{diff, log_op_end, log_op_error, log_op_start, parse, RunWarning};
use apitestgen_core_types::RunId;
use apitestgen_store::errors::Result;
use apitestgen_store::{load_document, scan, ScanOptions};
use serde::Serialize;
use std::path::Path;
use std::time::Instant;

/// Options for the diff command.
#[derive(Debug, Clone, Default)]
pub struct DiffOptions {
    pub overrides: ConfigOverrides,
}

/// Classification of every endpoint plus scan/diff warnings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffReport {
    pub run_id: String,
    pub result: DiffResult,
    pub warnings: Vec<RunWarning>,
}

impl DiffReport {
    /// Markdown summary suitable for a PR comment.
    pub fn human_summary(&self) -> String {
        render_human_summary(&self.result)
    }
}

/// Compare a contract with the repository's generated files.
///
/// ## Errors
///
/// Same fatal errors as [`crate::commands::generate`]; never writes.
pub fn diff_only(spec_path: &Path, repo_path: &Path, options: &DiffOptions) -> Result<DiffReport> {
    let run_id = RunId::new();
    log_op_start!(
        "diff_only",
        run_id = %run_id,
        spec = %spec_path.display(),
        repo = %repo_path.display()
    );
    let start = Instant::now();

    let report = diff_only_impl(spec_path, repo_path, options, &run_id).map_err(|e| {
        log_op_error!(
            "diff_only",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64,
            run_id = %run_id
        );
        e
    })?;

    log_op_end!(
        "diff_only",
        duration_ms = start.elapsed().as_millis() as u64,
        run_id = %run_id,
        to_create = report.result.to_create.len(),
        to_update = report.result.to_update.len(),
        to_skip = report.result.to_skip.len(),
        to_delete = report.result.to_delete.len()
    );

    Ok(report)
}

fn diff_only_impl(
    spec_path: &Path,
    repo_path: &Path,
    options: &DiffOptions,
    run_id: &RunId,
) -> Result<DiffReport> {
    let config = resolve_config(repo_path, &options.overrides)?;
    let document = load_document(spec_path)?;
    let spec = parse(&document)?;
    let scanned = scan(repo_path, &ScanOptions::from(&config))?;

    let DiffOutcome {
        result,
        warnings: diff_warnings,
    } = diff(&spec, &scanned.metadata, config.duplicate_policy)?;

    let mut warnings = scanned.warnings;
    warnings.extend(diff_warnings);

    Ok(DiffReport {
        run_id: run_id.to_string(),
        result,
        warnings,
    })
}
