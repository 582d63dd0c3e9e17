//! Coverage report model.
//!
//! Written next to the generated tests after every non-dry run; the store
//! crate owns the file I/O.

use crate::ir::EndpointId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Per-endpoint line of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointCoverage {
    pub endpoint_id: EndpointId,
    /// Test file covering the endpoint, relative to the repository root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<PathBuf>,
    pub negative_cases: usize,
    pub security_cases: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageReport {
    pub run_id: String,
    pub generated_at: DateTime<Utc>,
    pub spec_title: String,
    pub spec_version: String,
    pub total_endpoints: usize,
    pub covered_endpoints: usize,
    /// Two decimals; an empty contract is fully covered
    pub coverage_percentage: f64,
    pub endpoints: Vec<EndpointCoverage>,
}

impl CoverageReport {
    pub fn build(
        run_id: impl Into<String>,
        generated_at: DateTime<Utc>,
        spec_title: impl Into<String>,
        spec_version: impl Into<String>,
        mut endpoints: Vec<EndpointCoverage>,
    ) -> Self {
        endpoints.sort_by(|a, b| a.endpoint_id.cmp(&b.endpoint_id));

        let total_endpoints = endpoints.len();
        let covered_endpoints = endpoints.iter().filter(|e| e.file_path.is_some()).count();
        let coverage_percentage = if total_endpoints == 0 {
            100.0
        } else {
            let raw = covered_endpoints as f64 * 100.0 / total_endpoints as f64;
            (raw * 100.0).round() / 100.0
        };

        Self {
            run_id: run_id.into(),
            generated_at,
            spec_title: spec_title.into(),
            spec_version: spec_version.into(),
            total_endpoints,
            covered_endpoints,
            coverage_percentage,
            endpoints,
        }
    }
}
