//! Mutation provider trait and implementations
//!
//! The generation engine asks a `MutationProvider` for the negative cases of
//! each endpoint it writes, so callers can switch case families off or
//! substitute their own source of cases.

use crate::ir::{build_hash, Endpoint, SchemaKind};
use crate::mutation::engine::mutate;
use crate::mutation::model::{ErrorBodyExpectation, MutationCase};
use crate::mutation::security::{security_cases, SecurityCase};

/// Source of negative cases for an endpoint.
pub trait MutationProvider {
    /// Invalid-payload cases for the endpoint's request body
    fn negative_cases(&self, endpoint: &Endpoint) -> Vec<MutationCase>;

    /// Missing/invalid credential cases
    fn security_cases(&self, endpoint: &Endpoint) -> Vec<SecurityCase>;
}

/// Derives every case from the contract.
///
/// # Example
/// ```
/// use apitestgen_core::ir::{Endpoint, SchemaRef};
/// use apitestgen_core::mutation::{MutationProvider, SchemaMutationProvider};
///
/// let endpoint = Endpoint::new("POST", "/users")
///     .with_request(SchemaRef::object(vec![("name", SchemaRef::string())], vec!["name"]));
/// let cases = SchemaMutationProvider::default().negative_cases(&endpoint);
/// assert_eq!(cases[0].id, "missing_required_name");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SchemaMutationProvider {
    negative_tests: bool,
    security_tests: bool,
}

impl SchemaMutationProvider {
    pub fn new(negative_tests: bool, security_tests: bool) -> Self {
        Self {
            negative_tests,
            security_tests,
        }
    }
}

impl Default for SchemaMutationProvider {
    fn default() -> Self {
        Self::new(true, true)
    }
}

impl MutationProvider for SchemaMutationProvider {
    fn negative_cases(&self, endpoint: &Endpoint) -> Vec<MutationCase> {
        if !self.negative_tests {
            return Vec::new();
        }
        let Some(schema) = &endpoint.request_schema else {
            return Vec::new();
        };

        let error_body = error_body_expectation(endpoint);
        let mut cases = mutate(schema);
        for case in &mut cases {
            case.expectation.error_body = error_body.clone();
        }
        cases
    }

    fn security_cases(&self, endpoint: &Endpoint) -> Vec<SecurityCase> {
        if self.security_tests {
            security_cases(endpoint)
        } else {
            Vec::new()
        }
    }
}

/// Provider that yields nothing (happy-path-only files).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMutationProvider;

impl MutationProvider for NoMutationProvider {
    fn negative_cases(&self, _endpoint: &Endpoint) -> Vec<MutationCase> {
        Vec::new()
    }

    fn security_cases(&self, _endpoint: &Endpoint) -> Vec<SecurityCase> {
        Vec::new()
    }
}

/// Error-body assertion for endpoints that document a JSON 422/400 body.
pub fn error_body_expectation(endpoint: &Endpoint) -> Option<ErrorBodyExpectation> {
    let (status, schema) = endpoint.error_schema()?;
    let required_fields = match &schema.kind {
        SchemaKind::Object { required, .. } => required.iter().cloned().collect(),
        _ => Vec::new(),
    };
    Some(ErrorBodyExpectation {
        status: status.to_string(),
        schema_hash: build_hash(schema),
        required_fields,
    })
}
