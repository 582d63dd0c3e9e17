//! Non-fatal conditions surfaced in run summaries.

use crate::ir::EndpointId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// A managed file's header could not be parsed; the file is ignored
    MalformedHeader,
    /// Several files claim the same endpoint
    DuplicateMetadata,
    /// The machine-owned region of a file is missing or damaged; file left untouched
    UnpatchableMarkers,
    /// A file under the test directory could not be read
    UnreadableFile,
    /// The derived filename was taken; a disambiguating suffix was used
    FilenameCollision,
}

impl WarningKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningKind::MalformedHeader => "malformed_header",
            WarningKind::DuplicateMetadata => "duplicate_metadata",
            WarningKind::UnpatchableMarkers => "unpatchable_markers",
            WarningKind::UnreadableFile => "unreadable_file",
            WarningKind::FilenameCollision => "filename_collision",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunWarning {
    pub kind: WarningKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_id: Option<EndpointId>,
    pub message: String,
}

impl RunWarning {
    pub fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            file_path: None,
            endpoint_id: None,
            message: message.into(),
        }
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    pub fn with_endpoint(mut self, id: EndpointId) -> Self {
        self.endpoint_id = Some(id);
        self
    }
}

impl fmt::Display for RunWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.kind.as_str())?;
        if let Some(path) = &self.file_path {
            write!(f, " {}", path.display())?;
        }
        if let Some(id) = &self.endpoint_id {
            write!(f, " ({})", id)?;
        }
        write!(f, ": {}", self.message)
    }
}
