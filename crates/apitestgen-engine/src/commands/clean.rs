//! `clean`: remove every generated file.
//!
//! Only files with a valid metadata header are deleted. Unmanaged and
//! malformed files stay, and are reported as warnings in the latter case.

#![allow(clippy::result_large_err)]

use crate::commands::options::{resolve_config, ConfigOverrides};
use crate::commands::summary::RunSummary;
use apitestgen_core::{log_op_end, log_op_error, log_op_start, FileAction, FileFailure};
use apitestgen_core_types::RunId;
use apitestgen_store::errors::Result;
use apitestgen_store::report::report_path;
use apitestgen_store::{execute, remove_report, scan, ScanOptions};
use std::path::Path;
use std::time::Instant;

/// Options for the clean command.
#[derive(Debug, Clone, Default)]
pub struct CleanOptions {
    pub overrides: ConfigOverrides,
    pub dry_run: bool,
}

/// Delete all managed test files and the coverage report.
///
/// ## Errors
///
/// - `RepositoryNotFound`: `repo_path` is not a directory
/// - `Config`: invalid `apitestgen.toml` or overrides
pub fn clean(repo_path: &Path, options: &CleanOptions) -> Result<RunSummary> {
    let run_id = RunId::new();
    log_op_start!(
        "clean",
        run_id = %run_id,
        repo = %repo_path.display(),
        dry_run = options.dry_run
    );
    let start = Instant::now();

    let summary = clean_impl(repo_path, options, &run_id).map_err(|e| {
        log_op_error!(
            "clean",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64,
            run_id = %run_id
        );
        e
    })?;

    log_op_end!(
        "clean",
        duration_ms = start.elapsed().as_millis() as u64,
        run_id = %run_id,
        deleted = summary.deleted.len(),
        failures = summary.failures.len()
    );

    Ok(summary)
}

fn clean_impl(repo_path: &Path, options: &CleanOptions, run_id: &RunId) -> Result<RunSummary> {
    let config = resolve_config(repo_path, &options.overrides)?;
    let scanned = scan(repo_path, &ScanOptions::from(&config))?;

    let actions: Vec<FileAction> = scanned
        .metadata
        .iter()
        .map(|meta| FileAction::Delete {
            path: meta.file_path.clone(),
            endpoint_id: meta.endpoint_id.clone(),
        })
        .collect();

    let mut summary = RunSummary {
        run_id: run_id.to_string(),
        dry_run: options.dry_run,
        warnings: scanned.warnings,
        ..RunSummary::default()
    };

    if options.dry_run {
        summary.deleted = actions.iter().map(|a| a.path().clone()).collect();
        return Ok(summary);
    }

    let execution = execute(repo_path, &actions);
    summary.deleted = execution.deleted;
    summary.failures = execution.failures;

    match remove_report(repo_path, &config.test_dir) {
        Ok(true) => summary.deleted.push(report_path(&config.test_dir)),
        Ok(false) => {}
        Err(e) => summary.failures.push(FileFailure {
            path: report_path(&config.test_dir),
            action: "delete".to_string(),
            error: e.to_string(),
        }),
    }

    Ok(summary)
}
