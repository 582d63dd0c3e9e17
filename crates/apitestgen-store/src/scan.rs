//! Repository state scanner
//!
//! Recovers the metadata of previously generated files by reading their
//! headers. No other state exists: a file without a header is foreign and
//! is never patched or deleted.

#![allow(clippy::result_large_err)]

use crate::config::GeneratorConfig;
use crate::errors::{repository_not_found, Result};
use apitestgen_core::header::{parse_header, HeaderParse};
use apitestgen_core::{RunWarning, TestFileMetadata, WarningKind};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Where to look and which files count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    pub test_dir: PathBuf,
    pub file_extension: String,
}

impl From<&GeneratorConfig> for ScanOptions {
    fn from(config: &GeneratorConfig) -> Self {
        Self {
            test_dir: config.test_dir.clone(),
            file_extension: config.file_extension.clone(),
        }
    }
}

impl Default for ScanOptions {
    fn default() -> Self {
        ScanOptions::from(&GeneratorConfig::default())
    }
}

/// Result of one scan. Paths are relative to the repository root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Managed files with a valid header, in walk order
    pub metadata: Vec<TestFileMetadata>,
    /// Every file with the configured extension, managed or not
    pub existing_files: BTreeSet<PathBuf>,
    /// Files without a metadata header
    pub unmanaged: Vec<PathBuf>,
    /// Files whose header is present but unparseable
    pub malformed: BTreeSet<PathBuf>,
    pub warnings: Vec<RunWarning>,
}

/// Scan `<repo_root>/<test_dir>` for generated files.
///
/// The walk is sorted by file name and does not follow symlinks, so the
/// result (and the "last one wins" duplicate rule) is deterministic.
///
/// # Errors
///
/// Returns `RepositoryNotFound` when `repo_root` is not a directory. A
/// missing test directory is a brand-new repository and scans as empty.
pub fn scan(repo_root: &Path, options: &ScanOptions) -> Result<ScanReport> {
    if !repo_root.is_dir() {
        return Err(repository_not_found(repo_root));
    }

    let mut report = ScanReport::default();
    let test_root = repo_root.join(&options.test_dir);
    if !test_root.is_dir() {
        tracing::debug!(test_dir = %test_root.display(), "test directory absent, nothing to scan");
        return Ok(report);
    }

    let walker = WalkDir::new(&test_root)
        .follow_links(false)
        .sort_by_file_name();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let mut warning = RunWarning::new(WarningKind::UnreadableFile, e.to_string());
                if let Some(path) = e.path() {
                    warning = warning.with_file(relative(repo_root, path));
                }
                tracing::warn!(error = %e, "directory entry could not be read");
                report.warnings.push(warning);
                continue;
            }
        };

        if !entry.file_type().is_file() || !has_extension(entry.path(), &options.file_extension) {
            continue;
        }

        let rel = relative(repo_root, entry.path());
        report.existing_files.insert(rel.clone());

        let content = match fs::read(entry.path()).map(String::from_utf8) {
            Ok(Ok(content)) => content,
            Ok(Err(_)) => {
                report.warnings.push(unreadable(&rel, "file is not valid UTF-8"));
                continue;
            }
            Err(e) => {
                report.warnings.push(unreadable(&rel, &e.to_string()));
                continue;
            }
        };

        match parse_header(&content) {
            HeaderParse::Unmanaged => {
                tracing::debug!(file = %rel.display(), "unmanaged file skipped");
                report.unmanaged.push(rel);
            }
            HeaderParse::Malformed(reason) => {
                tracing::warn!(file = %rel.display(), reason = %reason, "malformed metadata header");
                report.warnings.push(
                    RunWarning::new(WarningKind::MalformedHeader, reason).with_file(&rel),
                );
                report.malformed.insert(rel);
            }
            HeaderParse::Parsed(fields) => report.metadata.push(fields.into_metadata(rel)),
        }
    }

    tracing::debug!(
        managed = report.metadata.len(),
        unmanaged = report.unmanaged.len(),
        warnings = report.warnings.len(),
        "scan complete"
    );
    Ok(report)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(extension))
}

fn relative(root: &Path, path: &Path) -> PathBuf {
    path.strip_prefix(root).unwrap_or(path).to_path_buf()
}

fn unreadable(path: &Path, reason: &str) -> RunWarning {
    tracing::warn!(file = %path.display(), reason, "unreadable test file");
    RunWarning::new(WarningKind::UnreadableFile, reason).with_file(path)
}
