//! File-level decisions made by the generation engine.
//!
//! The engine decides what to write; the store executes the actions.

use crate::ir::EndpointId;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One file operation. Paths are relative to the repository root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum FileAction {
    Create {
        path: PathBuf,
        endpoint_id: EndpointId,
        content: String,
    },
    /// Full replacement content for an existing file whose header and
    /// machine-owned region were rewritten
    Patch {
        path: PathBuf,
        endpoint_id: EndpointId,
        content: String,
    },
    Delete {
        path: PathBuf,
        endpoint_id: EndpointId,
    },
}

impl FileAction {
    pub fn path(&self) -> &PathBuf {
        match self {
            FileAction::Create { path, .. }
            | FileAction::Patch { path, .. }
            | FileAction::Delete { path, .. } => path,
        }
    }

    pub fn endpoint_id(&self) -> &EndpointId {
        match self {
            FileAction::Create { endpoint_id, .. }
            | FileAction::Patch { endpoint_id, .. }
            | FileAction::Delete { endpoint_id, .. } => endpoint_id,
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            FileAction::Create { .. } => "create",
            FileAction::Patch { .. } => "patch",
            FileAction::Delete { .. } => "delete",
        }
    }
}

/// A file operation that failed; the run continues with the rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub action: String,
    pub error: String,
}
