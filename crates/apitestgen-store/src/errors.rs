//! Error handling for apitestgen-store
//!
//! Wraps apitestgen-core ExError with store-specific helpers

use apitestgen_core::errors::{ExError, ExErrorKind};
use std::path::Path;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// Create an IO error naming the file involved
pub fn io_error_at(operation: &str, path: &Path, err: std::io::Error) -> ExError {
    io_error(operation, err).with_file_path(path.display().to_string())
}

/// Create a missing repository error
pub fn repository_not_found(path: &Path) -> ExError {
    ExError::new(ExErrorKind::RepositoryNotFound)
        .with_op("scan")
        .with_file_path(path.display().to_string())
        .with_message("repository root does not exist or is not a directory")
}

/// Create a configuration error
pub fn config_error(path: &Path, reason: &str) -> ExError {
    ExError::new(ExErrorKind::Config)
        .with_op("load_config")
        .with_file_path(path.display().to_string())
        .with_message(reason.to_string())
}

/// Create a contract document error (unreadable or not JSON/YAML)
pub fn document_error(path: &Path, reason: &str) -> ExError {
    ExError::new(ExErrorKind::InvalidDocument)
        .with_op("load_document")
        .with_file_path(path.display().to_string())
        .with_message(reason.to_string())
}

/// Create a serialization error
pub fn serialization_error(operation: &str, err: serde_json::Error) -> ExError {
    ExError::new(ExErrorKind::Serialization)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}
