//! apitestgen core - pure kernel of the contract/test synchronisation pipeline
//!
//! This crate provides everything that does not touch the file system:
//! - Canonical IR of an OpenAPI contract with structural hashing
//! - Contract parser from a raw OpenAPI 3.x document
//! - The metadata header codec shared by the scanner and the generator
//! - Diff engine classifying endpoints as create/update/skip/delete
//! - Negative mutation engine and security negative cases
//! - Pytest file rendering and coverage report model
//! - Error and logging facilities used by every other crate

pub mod actions;
pub mod diff;
pub mod errors;
pub mod header;
pub mod ir;
pub mod logging_facility;
pub mod metadata;
pub mod mutation;
pub mod parser;
pub mod render;
pub mod report;
pub mod warnings;

// Re-export commonly used types
pub use actions::{FileAction, FileFailure};
pub use diff::{diff, DiffOutcome, DiffResult, DuplicatePolicy};
pub use errors::{ContractError, ExError, ExErrorKind, Result};
pub use ir::{build_hash, ApiSpec, Endpoint, EndpointId, ResponseBody, SchemaHash, SchemaRef};
pub use metadata::TestFileMetadata;
pub use mutation::{mutate, MutationCase, MutationProvider, SchemaMutationProvider};
pub use parser::parse;
pub use report::{CoverageReport, EndpointCoverage};
pub use warnings::{RunWarning, WarningKind};
