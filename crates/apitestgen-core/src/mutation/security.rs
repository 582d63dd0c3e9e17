//! Credential negative cases for guarded endpoints.

use crate::ir::Endpoint;
use crate::mutation::model::AUTH_STATUSES;
use serde::{Deserialize, Serialize};

/// A request made with a missing or unusable credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityCase {
    pub id: String,
    /// Bearer token to send; `None` sends no credential at all
    pub token: Option<String>,
    pub statuses: Vec<u16>,
    pub reason: String,
}

/// Cases for an endpoint with a non-empty security requirement.
pub fn security_cases(endpoint: &Endpoint) -> Vec<SecurityCase> {
    if endpoint.security.is_empty() {
        return Vec::new();
    }

    let case = |id: &str, token: Option<&str>, reason: &str| SecurityCase {
        id: id.to_string(),
        token: token.map(str::to_string),
        statuses: AUTH_STATUSES.to_vec(),
        reason: reason.to_string(),
    };

    vec![
        case("security_no_token", None, "request without credentials"),
        case(
            "security_invalid_token",
            Some("INVALID_TOKEN_123"),
            "request with an invalid token",
        ),
        case(
            "security_expired_token",
            Some("EXPIRED_TOKEN_MOCK"),
            "request with an expired token",
        ),
    ]
}
