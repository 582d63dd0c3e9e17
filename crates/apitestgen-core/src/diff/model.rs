//! Diff output types.
//!
//! All types implement `Debug, Clone, Serialize, Deserialize, PartialEq`.
//! Every sequence is ordered by endpoint path, then method.

use crate::ir::{Endpoint, EndpointId};
use crate::metadata::TestFileMetadata;
use crate::warnings::RunWarning;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What to do when several generated files claim the same endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Use the last file in scan order and warn
    #[default]
    LastWins,
    /// Use the first file in scan order and warn
    FirstWins,
    /// Abort the run
    Reject,
}

impl FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "last-wins" => Ok(DuplicatePolicy::LastWins),
            "first-wins" => Ok(DuplicatePolicy::FirstWins),
            "reject" => Ok(DuplicatePolicy::Reject),
            other => Err(format!(
                "unknown duplicate policy '{other}' (expected last-wins, first-wins or reject)"
            )),
        }
    }
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DuplicatePolicy::LastWins => "last-wins",
            DuplicatePolicy::FirstWins => "first-wins",
            DuplicatePolicy::Reject => "reject",
        })
    }
}

/// Why an endpoint was classified as Update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum ChangeReason {
    RequestSchemaChanged,
    ResponseSchemaChanged { status: String },
    /// Documented in the contract, absent from the file's header
    ResponseStatusAdded { status: String },
    /// Recorded in the file's header, no longer documented
    ResponseStatusRemoved { status: String },
}

impl fmt::Display for ChangeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeReason::RequestSchemaChanged => write!(f, "request schema changed"),
            ChangeReason::ResponseSchemaChanged { status } => {
                write!(f, "response {status} schema changed")
            }
            ChangeReason::ResponseStatusAdded { status } => write!(f, "response {status} added"),
            ChangeReason::ResponseStatusRemoved { status } => {
                write!(f, "response {status} removed")
            }
        }
    }
}

/// One classified endpoint.
///
/// - create: `endpoint` set, `metadata` empty
/// - update / skip: both set
/// - delete: `metadata` set, `endpoint` empty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffEntry {
    pub endpoint_id: EndpointId,
    #[serde(skip)]
    pub endpoint: Option<Endpoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<TestFileMetadata>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<ChangeReason>,
}

/// The four classified sequences of one diff cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiffResult {
    pub to_create: Vec<DiffEntry>,
    pub to_update: Vec<DiffEntry>,
    pub to_skip: Vec<DiffEntry>,
    pub to_delete: Vec<DiffEntry>,
}

impl DiffResult {
    /// True when the repository already matches the contract.
    pub fn is_noop(&self) -> bool {
        self.to_create.is_empty() && self.to_update.is_empty() && self.to_delete.is_empty()
    }

    pub fn ids(entries: &[DiffEntry]) -> Vec<&EndpointId> {
        entries.iter().map(|e| &e.endpoint_id).collect()
    }
}

/// Diff result plus the non-fatal findings made while building it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiffOutcome {
    pub result: DiffResult,
    pub warnings: Vec<RunWarning>,
}
