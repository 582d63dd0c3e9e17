//! Contract parser: raw OpenAPI 3.x document to canonical IR.
//!
//! The loader hands over an already-parsed `serde_json::Value`; this module
//! never touches the file system.

pub mod document;
pub mod openapi;

pub use openapi::parse;
