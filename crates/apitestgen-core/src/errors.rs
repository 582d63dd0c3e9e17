use thiserror::Error;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Every fatal condition in apitestgen is classified by one of these kinds.
/// Each kind maps to a stable error code that front ends can use for exit
/// codes, tests and machine-readable output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Input
    InvalidInput,
    Config,

    // Contract
    /// The document is not a structurally valid OpenAPI document
    InvalidDocument,
    /// The declared `openapi` version is not 3.x
    UnsupportedVersion,
    /// A `$ref` does not resolve inside the same document
    UnresolvedReference,
    /// A body is declared only in non-JSON media types
    UnsupportedContentType,
    /// A schema combination the IR cannot represent
    UnsupportedConstruct,
    /// Two operations normalise to the same (method, path)
    DuplicateEndpoint,

    // Repository
    RepositoryNotFound,
    /// Several generated files claim the same endpoint and the policy rejects it
    DuplicateMetadata,
    MalformedHeader,

    // Integration/IO
    Io,
    Serialization,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::Config => "ERR_CONFIG",
            ExErrorKind::InvalidDocument => "ERR_INVALID_DOCUMENT",
            ExErrorKind::UnsupportedVersion => "ERR_UNSUPPORTED_VERSION",
            ExErrorKind::UnresolvedReference => "ERR_UNRESOLVED_REFERENCE",
            ExErrorKind::UnsupportedContentType => "ERR_UNSUPPORTED_CONTENT_TYPE",
            ExErrorKind::UnsupportedConstruct => "ERR_UNSUPPORTED_CONSTRUCT",
            ExErrorKind::DuplicateEndpoint => "ERR_DUPLICATE_ENDPOINT",
            ExErrorKind::RepositoryNotFound => "ERR_REPOSITORY_NOT_FOUND",
            ExErrorKind::DuplicateMetadata => "ERR_DUPLICATE_METADATA",
            ExErrorKind::MalformedHeader => "ERR_MALFORMED_HEADER",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// True for the contract-error family, which aborts a run before any file is touched
    pub fn is_contract_error(&self) -> bool {
        matches!(
            self,
            ExErrorKind::InvalidDocument
                | ExErrorKind::UnsupportedVersion
                | ExErrorKind::UnresolvedReference
                | ExErrorKind::UnsupportedContentType
                | ExErrorKind::UnsupportedConstruct
                | ExErrorKind::DuplicateEndpoint
        )
    }
}

/// Canonical structured error type
///
/// Carries the classification plus enough context (operation, endpoint,
/// file) to point a user at the offending input.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    endpoint_id: Option<String>,
    file_path: Option<String>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            endpoint_id: None,
            file_path: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add endpoint context (`METHOD PATH`)
    pub fn with_endpoint_id(mut self, id: impl Into<String>) -> Self {
        self.endpoint_id = Some(id.into());
        self
    }

    /// Add file context
    pub fn with_file_path(mut self, path: impl Into<String>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the endpoint context, if any
    pub fn endpoint_id(&self) -> Option<&str> {
        self.endpoint_id.as_deref()
    }

    /// Get the file context, if any
    pub fn file_path(&self) -> Option<&str> {
        self.file_path.as_deref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {:?}", self.code(), self.kind)?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(endpoint_id) = &self.endpoint_id {
            write!(f, " (endpoint_id: {})", endpoint_id)?;
        }
        if let Some(file_path) = &self.file_path {
            write!(f, " (file: {})", file_path)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Contract errors raised while building the IR
///
/// Any of these aborts the run before a single file is touched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContractError {
    #[error("Unsupported OpenAPI version: {version} (only 3.x is supported)")]
    UnsupportedVersion { version: String },

    #[error("Unresolved reference: {reference}")]
    UnresolvedReference { reference: String },

    #[error("Unsupported content type for {location}: {media_types:?} (no JSON media type)")]
    UnsupportedContentType {
        endpoint_id: String,
        location: String,
        media_types: Vec<String>,
    },

    #[error("Unsupported schema construct at {location}: {reason}")]
    UnsupportedConstruct { location: String, reason: String },

    #[error("Duplicate endpoint: {endpoint_id}")]
    DuplicateEndpoint { endpoint_id: String },

    #[error("Invalid OpenAPI document: {reason}")]
    InvalidDocument { reason: String },
}

impl From<ContractError> for ExError {
    fn from(err: ContractError) -> Self {
        let message = err.to_string();
        match err {
            ContractError::UnsupportedVersion { .. } => {
                ExError::new(ExErrorKind::UnsupportedVersion)
                    .with_op("parse_contract")
                    .with_message(message)
            }
            ContractError::UnresolvedReference { .. } => {
                ExError::new(ExErrorKind::UnresolvedReference)
                    .with_op("resolve_ref")
                    .with_message(message)
            }
            ContractError::UnsupportedContentType { endpoint_id, .. } => {
                ExError::new(ExErrorKind::UnsupportedContentType)
                    .with_op("parse_body")
                    .with_endpoint_id(endpoint_id)
                    .with_message(message)
            }
            ContractError::UnsupportedConstruct { .. } => {
                ExError::new(ExErrorKind::UnsupportedConstruct)
                    .with_op("parse_schema")
                    .with_message(message)
            }
            ContractError::DuplicateEndpoint { endpoint_id } => {
                ExError::new(ExErrorKind::DuplicateEndpoint)
                    .with_op("parse_contract")
                    .with_endpoint_id(endpoint_id)
                    .with_message(message)
            }
            ContractError::InvalidDocument { .. } => ExError::new(ExErrorKind::InvalidDocument)
                .with_op("parse_contract")
                .with_message(message),
        }
    }
}

impl From<serde_json::Error> for ExError {
    fn from(err: serde_json::Error) -> Self {
        ExError::new(ExErrorKind::Serialization).with_message(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_code_op_and_context() {
        let err = ExError::new(ExErrorKind::MalformedHeader)
            .with_op("scan")
            .with_file_path("tests/api/test_get_users.py")
            .with_message("missing last_generated");

        let rendered = err.to_string();
        assert!(rendered.starts_with("[ERR_MALFORMED_HEADER]"));
        assert!(rendered.contains("in operation 'scan'"));
        assert!(rendered.contains("missing last_generated"));
        assert!(rendered.contains("(file: tests/api/test_get_users.py)"));
    }

    #[test]
    fn test_contract_error_conversion_keeps_endpoint() {
        let err: ExError = ContractError::UnsupportedContentType {
            endpoint_id: "POST /users".to_string(),
            location: "request body of POST /users".to_string(),
            media_types: vec!["application/xml".to_string()],
        }
        .into();

        assert_eq!(err.kind(), ExErrorKind::UnsupportedContentType);
        assert_eq!(err.endpoint_id(), Some("POST /users"));
        assert!(err.message().contains("application/xml"));
    }

    #[test]
    fn test_contract_family() {
        assert!(ExErrorKind::UnsupportedVersion.is_contract_error());
        assert!(ExErrorKind::UnresolvedReference.is_contract_error());
        assert!(!ExErrorKind::RepositoryNotFound.is_contract_error());
        assert!(!ExErrorKind::Io.is_contract_error());
    }

    #[test]
    fn test_source_chain() {
        let inner = ExError::new(ExErrorKind::Io).with_message("disk full");
        let outer = ExError::new(ExErrorKind::Internal).with_source(inner);
        assert_eq!(
            outer.source_error().map(|e| e.kind()),
            Some(ExErrorKind::Io)
        );
        assert!(std::error::Error::source(&outer).is_some());
    }
}
