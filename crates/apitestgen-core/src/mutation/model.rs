//! Mutation case types.

use crate::ir::SchemaHash;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Statuses accepted for a rejected payload; either is valid.
pub const VALIDATION_STATUSES: [u16; 2] = [400, 422];

/// Statuses accepted for a rejected credential.
pub const AUTH_STATUSES: [u16; 2] = [401, 403];

/// Longest string or array a baseline or mutation case will materialize.
pub const MAX_SYNTHESIZED_LEN: u64 = 4096;

/// Field name used for cases that mutate the whole body.
pub const ROOT_FIELD: &str = "$";

/// Kind of constraint a case violates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationCategory {
    MissingRequired,
    WrongType,
    NullInjection,
    InvalidEnum,
    BelowMinimum,
    AboveMaximum,
    FormatViolation,
}

impl MutationCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationCategory::MissingRequired => "missing_required",
            MutationCategory::WrongType => "wrong_type",
            MutationCategory::NullInjection => "null_injection",
            MutationCategory::InvalidEnum => "invalid_enum",
            MutationCategory::BelowMinimum => "below_minimum",
            MutationCategory::AboveMaximum => "above_maximum",
            MutationCategory::FormatViolation => "format_violation",
        }
    }
}

impl fmt::Display for MutationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the response body must show when the contract declares an error
/// schema for validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBodyExpectation {
    /// Status whose body was used (`422` preferred over `400`)
    pub status: String,
    pub schema_hash: SchemaHash,
    /// Top-level required fields of the error body
    pub required_fields: Vec<String>,
}

/// Assertion descriptor attached to every case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedFailure {
    pub statuses: Vec<u16>,
    pub field: String,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_body: Option<ErrorBodyExpectation>,
}

/// One invalid-payload test case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationCase {
    /// Identifier-safe and unique within one endpoint
    pub id: String,
    pub category: MutationCategory,
    /// Top-level property name, or `$` for the whole body
    pub field: String,
    pub payload: Value,
    pub expectation: ExpectedFailure,
}
