//! Applies planned file actions to a repository.
//!
//! One failing file never stops the others: each failure is recorded and
//! processing continues.

use crate::fs::atomic::atomic_write;
use apitestgen_core::{FileAction, FileFailure};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// What happened on disk. Paths are relative to the repository root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    pub created: Vec<PathBuf>,
    pub patched: Vec<PathBuf>,
    pub deleted: Vec<PathBuf>,
    pub failures: Vec<FileFailure>,
}

impl ExecutionReport {
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Execute `actions` in order against `repo_root`.
pub fn execute(repo_root: &Path, actions: &[FileAction]) -> ExecutionReport {
    let mut report = ExecutionReport::default();

    for action in actions {
        let target = repo_root.join(action.path());
        let outcome = match action {
            FileAction::Create { content, .. } | FileAction::Patch { content, .. } => {
                atomic_write(&target, content.as_bytes()).map_err(|e| e.to_string())
            }
            FileAction::Delete { .. } => match fs::remove_file(&target) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    tracing::debug!(file = %target.display(), "already deleted");
                    Ok(())
                }
                Err(e) => Err(e.to_string()),
            },
        };

        match outcome {
            Ok(()) => {
                let path = action.path().clone();
                match action {
                    FileAction::Create { .. } => report.created.push(path),
                    FileAction::Patch { .. } => report.patched.push(path),
                    FileAction::Delete { .. } => report.deleted.push(path),
                }
            }
            Err(error) => {
                tracing::warn!(
                    file = %action.path().display(),
                    action = action.verb(),
                    error = %error,
                    "file action failed"
                );
                report.failures.push(FileFailure {
                    path: action.path().clone(),
                    action: action.verb().to_string(),
                    error,
                });
            }
        }
    }

    report
}
