//! `generate`: bring the test directory in sync with a contract.
//!
//! ## Pipeline (in order):
//! 1. Resolve config (repository root must exist)
//! 2. Load and parse the contract (contract errors abort here)
//! 3. Scan the repository
//! 4. Diff
//! 5. Plan file actions
//! 6. Execute (skipped on dry run)
//! 7. Write the coverage report
//!
//! Nothing is written before step 6, so every fatal error leaves the
//! repository as it was.

#![allow(clippy::result_large_err)]

use crate::commands::options::{resolve_config, ConfigOverrides};
use crate::commands::summary::RunSummary;
use crate::generation::{apply, GenerationContext, GenerationPlan};
use apitestgen_core::diff::{DiffOutcome, DiffResult};
use apitestgen_core::mutation::{MutationProvider, SchemaMutationProvider};
use apitestgen_core::render::{RenderContext, DEFAULT_BASE_URL};
use apitestgen_core::{
    diff, log_op_end, log_op_error, log_op_start, parse, ApiSpec, CoverageReport,
    EndpointCoverage, EndpointId, FileAction, FileFailure,
};
use apitestgen_core_types::RunId;
use apitestgen_store::errors::Result;
use apitestgen_store::report::report_path;
use apitestgen_store::{execute, load_document, scan, write_report, GeneratorConfig, ScanOptions};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Options for the generate command.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub overrides: ConfigOverrides,
    /// Plan only: report what would change without touching any file
    pub dry_run: bool,
    /// Timestamp written into headers; `None` means now
    pub generated_at: Option<DateTime<Utc>>,
}

/// Generate new test files, patch outdated ones and delete orphans.
///
/// ## Errors
///
/// - `RepositoryNotFound`: `repo_path` is not a directory
/// - `Config`: invalid `apitestgen.toml` or overrides
/// - `InvalidDocument` and the contract kinds: the contract cannot be used
/// - `DuplicateMetadata`: duplicates under the `reject` policy
///
/// Per-file problems never fail the run; they are reported in the summary.
pub fn generate(spec_path: &Path, repo_path: &Path, options: &GenerateOptions) -> Result<RunSummary> {
    let run_id = RunId::new();
    log_op_start!(
        "generate",
        run_id = %run_id,
        spec = %spec_path.display(),
        repo = %repo_path.display(),
        dry_run = options.dry_run
    );
    let start = Instant::now();

    let summary = generate_impl(spec_path, repo_path, options, &run_id).map_err(|e| {
        log_op_error!(
            "generate",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64,
            run_id = %run_id
        );
        e
    })?;

    log_op_end!(
        "generate",
        duration_ms = start.elapsed().as_millis() as u64,
        run_id = %run_id,
        created = summary.created.len(),
        updated = summary.updated.len(),
        deleted = summary.deleted.len(),
        skipped = summary.skipped.len(),
        warnings = summary.warnings.len(),
        failures = summary.failures.len()
    );

    Ok(summary)
}

fn generate_impl(
    spec_path: &Path,
    repo_path: &Path,
    options: &GenerateOptions,
    run_id: &RunId,
) -> Result<RunSummary> {
    let config = resolve_config(repo_path, &options.overrides)?;

    let document = load_document(spec_path)?;
    let spec = parse(&document)?;
    tracing::debug!(endpoints = spec.len(), title = %spec.title, "contract parsed");

    let scanned = scan(repo_path, &ScanOptions::from(&config))?;
    let DiffOutcome {
        result,
        warnings: diff_warnings,
    } = diff(&spec, &scanned.metadata, config.duplicate_policy)?;

    let provider = SchemaMutationProvider::new(config.negative_tests, config.security_tests);
    let generated_at = options.generated_at.unwrap_or_else(Utc::now);
    let ctx = GenerationContext {
        repo_root: repo_path.to_path_buf(),
        test_dir: config.test_dir.clone(),
        file_extension: config.file_extension.clone(),
        render: render_context(&config, &spec),
        generated_at,
        existing_files: scanned.existing_files.clone(),
        repairable: scanned.malformed.clone(),
    };
    let GenerationPlan { actions, warnings } = apply(&result, &provider, &ctx);

    let mut summary = RunSummary {
        run_id: run_id.to_string(),
        dry_run: options.dry_run,
        skipped: DiffResult::ids(&result.to_skip).into_iter().cloned().collect(),
        ..RunSummary::default()
    };
    summary.warnings.extend(scanned.warnings);
    summary.warnings.extend(diff_warnings);
    summary.warnings.extend(warnings);

    if options.dry_run {
        for action in &actions {
            let path = action.path().clone();
            match action {
                FileAction::Create { .. } => summary.created.push(path),
                FileAction::Patch { .. } => summary.updated.push(path),
                FileAction::Delete { .. } => summary.deleted.push(path),
            }
        }
        return Ok(summary);
    }

    let execution = execute(repo_path, &actions);
    summary.created = execution.created;
    summary.updated = execution.patched;
    summary.deleted = execution.deleted;
    summary.failures = execution.failures;

    if config.write_report {
        let report = coverage_report(
            run_id,
            generated_at,
            &spec,
            &result,
            &actions,
            &summary.failures,
            &provider,
        );
        match write_report(repo_path, &config.test_dir, &report) {
            Ok(path) => summary.report_path = Some(path),
            Err(e) => {
                tracing::warn!(error = %e, "coverage report not written");
                summary.failures.push(FileFailure {
                    path: report_path(&config.test_dir),
                    action: "write_report".to_string(),
                    error: e.to_string(),
                });
            }
        }
    }

    Ok(summary)
}

/// Base URL precedence: config, then the contract's first absolute server,
/// then the built-in default.
fn render_context(config: &GeneratorConfig, spec: &ApiSpec) -> RenderContext {
    let default_base_url = config
        .default_base_url
        .clone()
        .or_else(|| {
            spec.servers
                .iter()
                .find(|url| url.starts_with("http://") || url.starts_with("https://"))
                .map(|url| url.trim_end_matches('/').to_string())
        })
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    RenderContext {
        base_url_env: config.base_url_env.clone(),
        default_base_url,
    }
}

/// Which file covers each endpoint after execution.
fn coverage_report(
    run_id: &RunId,
    generated_at: DateTime<Utc>,
    spec: &ApiSpec,
    result: &DiffResult,
    actions: &[FileAction],
    failures: &[FileFailure],
    provider: &dyn MutationProvider,
) -> CoverageReport {
    let mut files: BTreeMap<&EndpointId, PathBuf> = BTreeMap::new();
    for entry in result.to_skip.iter().chain(&result.to_update) {
        if let Some(meta) = &entry.metadata {
            files.insert(&entry.endpoint_id, meta.file_path.clone());
        }
    }

    // A failed create leaves the endpoint uncovered; a failed patch keeps
    // the old file in place.
    let failed: BTreeSet<&PathBuf> = failures.iter().map(|f| &f.path).collect();
    for action in actions {
        if let FileAction::Create {
            path, endpoint_id, ..
        } = action
        {
            if !failed.contains(path) {
                files.insert(endpoint_id, path.clone());
            }
        }
    }

    let lines = spec
        .endpoints()
        .map(|endpoint| EndpointCoverage {
            endpoint_id: endpoint.id.clone(),
            file_path: files.get(&endpoint.id).cloned(),
            negative_cases: provider.negative_cases(endpoint).len(),
            security_cases: provider.security_cases(endpoint).len(),
        })
        .collect();

    CoverageReport::build(
        run_id.as_str(),
        generated_at,
        spec.title.clone(),
        spec.version.clone(),
        lines,
    )
}
