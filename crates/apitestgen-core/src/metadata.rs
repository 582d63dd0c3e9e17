//! Generation state recovered from a test file's header.

use crate::ir::{EndpointId, SchemaHash};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Metadata of one managed test file, produced fresh by every scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestFileMetadata {
    pub endpoint_id: EndpointId,
    /// `None` records that the endpoint had no request body
    pub request_schema_hash: Option<SchemaHash>,
    pub response_schema_hashes: BTreeMap<String, SchemaHash>,
    pub last_generated: DateTime<Utc>,
    /// Path relative to the repository root
    pub file_path: PathBuf,
}
