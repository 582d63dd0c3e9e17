//! apitestgen store - file-system boundary
//!
//! Provides:
//! - OpenAPI document loading (JSON or YAML)
//! - `apitestgen.toml` configuration
//! - Repository state scanner recovering metadata from file headers
//! - Atomic file writes and the file-action executor
//! - Coverage report persistence

pub mod config;
pub mod errors;
pub mod fs;
pub mod loader;
pub mod report;
pub mod scan;

// Re-export key types
pub use config::{load_config, GeneratorConfig, CONFIG_FILE_NAME};
pub use errors::Result;
pub use fs::{execute, ExecutionReport};
pub use loader::load_document;
pub use report::{remove_report, write_report, REPORT_FILE_NAME};
pub use scan::{scan, ScanOptions, ScanReport};
