//! IR value types.
//!
//! All collections are `BTreeMap`/`BTreeSet` so iteration order, and therefore
//! anything derived from it, is deterministic.

use crate::errors::ContractError;
use crate::ir::hash::{build_hash, canonical_form, hash_response, SchemaHash};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Numeric, length and item-count bounds declared on a schema node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(default)]
    pub exclusive_minimum: bool,
    #[serde(default)]
    pub exclusive_maximum: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl Constraints {
    pub fn is_empty(&self) -> bool {
        *self == Constraints::default()
    }
}

/// Kind-specific payload of a schema node.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SchemaKind {
    Object {
        properties: BTreeMap<String, SchemaRef>,
        required: BTreeSet<String>,
    },
    Array {
        items: Option<Box<SchemaRef>>,
    },
    String,
    Number,
    Integer,
    Boolean,
    /// Declared literal set; order is kept for baseline synthesis but is
    /// insignificant for equality and hashing.
    Enum {
        values: Vec<Value>,
    },
    Null,
    /// `anyOf` / `oneOf`; variant order is insignificant.
    Union {
        variants: Vec<SchemaRef>,
    },
    /// No type information at all (`{}`).
    Any,
    /// Placeholder for a component schema that refers back to itself.
    Recursive {
        name: String,
    },
}

/// Immutable schema tree node.
///
/// Equality is structural: two nodes are equal exactly when their canonical
/// forms are equal, which is also when their hashes are equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaRef {
    #[serde(flatten)]
    pub kind: SchemaKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Constraints::is_empty")]
    pub constraints: Constraints,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub write_only: bool,
}

impl SchemaRef {
    pub fn new(kind: SchemaKind) -> Self {
        Self {
            kind,
            format: None,
            constraints: Constraints::default(),
            nullable: false,
            read_only: false,
            write_only: false,
        }
    }

    pub fn string() -> Self {
        Self::new(SchemaKind::String)
    }

    pub fn integer() -> Self {
        Self::new(SchemaKind::Integer)
    }

    pub fn number() -> Self {
        Self::new(SchemaKind::Number)
    }

    pub fn boolean() -> Self {
        Self::new(SchemaKind::Boolean)
    }

    pub fn null() -> Self {
        Self::new(SchemaKind::Null)
    }

    pub fn any() -> Self {
        Self::new(SchemaKind::Any)
    }

    pub fn array(items: SchemaRef) -> Self {
        Self::new(SchemaKind::Array {
            items: Some(Box::new(items)),
        })
    }

    pub fn enumeration(values: Vec<Value>) -> Self {
        Self::new(SchemaKind::Enum { values })
    }

    /// Object node from `(name, schema)` pairs and the required names.
    pub fn object<I, R, S>(properties: I, required: R) -> Self
    where
        I: IntoIterator<Item = (S, SchemaRef)>,
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(SchemaKind::Object {
            properties: properties
                .into_iter()
                .map(|(name, schema)| (name.into(), schema))
                .collect(),
            required: required.into_iter().map(Into::into).collect(),
        })
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn with_constraints(mut self, constraints: Constraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn with_minimum(mut self, minimum: f64) -> Self {
        self.constraints.minimum = Some(minimum);
        self
    }

    pub fn with_maximum(mut self, maximum: f64) -> Self {
        self.constraints.maximum = Some(maximum);
        self
    }

    pub fn with_length(mut self, min: Option<u64>, max: Option<u64>) -> Self {
        self.constraints.min_length = min;
        self.constraints.max_length = max;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Stable lowercase name of the node's kind.
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            SchemaKind::Object { .. } => "object",
            SchemaKind::Array { .. } => "array",
            SchemaKind::String => "string",
            SchemaKind::Number => "number",
            SchemaKind::Integer => "integer",
            SchemaKind::Boolean => "boolean",
            SchemaKind::Enum { .. } => "enum",
            SchemaKind::Null => "null",
            SchemaKind::Union { .. } => "union",
            SchemaKind::Any => "any",
            SchemaKind::Recursive { .. } => "recursive",
        }
    }

    /// Object properties, empty for every other kind.
    pub fn properties(&self) -> Option<&BTreeMap<String, SchemaRef>> {
        match &self.kind {
            SchemaKind::Object { properties, .. } => Some(properties),
            _ => None,
        }
    }

    pub fn is_required(&self, name: &str) -> bool {
        matches!(&self.kind, SchemaKind::Object { required, .. } if required.contains(name))
    }
}

impl PartialEq for SchemaRef {
    fn eq(&self, other: &Self) -> bool {
        canonical_form(self) == canonical_form(other)
    }
}

/// `(METHOD, path)` identity of an operation.
///
/// Field order drives the derived ordering: path first, then method.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct EndpointId {
    path: String,
    method: String,
}

impl EndpointId {
    /// Build an id; the method is uppercased.
    pub fn new(method: impl AsRef<str>, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: method.as_ref().to_ascii_uppercase(),
        }
    }

    /// Parse the `METHOD PATH` form used in headers and logs.
    pub fn parse(s: &str) -> Option<Self> {
        let (method, path) = s.trim().split_once(char::is_whitespace)?;
        let path = path.trim();
        if method.is_empty()
            || !method.chars().all(|c| c.is_ascii_alphabetic())
            || !path.starts_with('/')
            || path.contains(char::is_whitespace)
        {
            return None;
        }
        Some(Self::new(method, path))
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

impl From<EndpointId> for String {
    fn from(id: EndpointId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for EndpointId {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        EndpointId::parse(&value).ok_or_else(|| format!("invalid endpoint id: {value}"))
    }
}

/// A documented response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "body", content = "schema", rename_all = "snake_case")]
pub enum ResponseBody {
    /// No content (e.g. 204, or `content: {}`)
    Empty,
    Json(SchemaRef),
}

impl ResponseBody {
    pub fn is_empty(&self) -> bool {
        matches!(self, ResponseBody::Empty)
    }

    pub fn schema(&self) -> Option<&SchemaRef> {
        match self {
            ResponseBody::Empty => None,
            ResponseBody::Json(schema) => Some(schema),
        }
    }
}

/// One operation of the contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    pub id: EndpointId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_schema: Option<SchemaRef>,
    /// Status code (as declared: `200`, `4XX`, `default`) to body
    pub responses: BTreeMap<String, ResponseBody>,
    /// Names of the security schemes that guard this operation
    #[serde(default)]
    pub security: BTreeSet<String>,
    #[serde(default)]
    pub servers: Vec<String>,
}

impl Endpoint {
    pub fn new(method: impl AsRef<str>, path: impl Into<String>) -> Self {
        Self {
            id: EndpointId::new(method, path),
            operation_id: None,
            summary: None,
            request_schema: None,
            responses: BTreeMap::new(),
            security: BTreeSet::new(),
            servers: Vec::new(),
        }
    }

    pub fn with_request(mut self, schema: SchemaRef) -> Self {
        self.request_schema = Some(schema);
        self
    }

    pub fn with_response(mut self, status: impl Into<String>, body: ResponseBody) -> Self {
        self.responses.insert(status.into(), body);
        self
    }

    pub fn with_security(mut self, scheme: impl Into<String>) -> Self {
        self.security.insert(scheme.into());
        self
    }

    /// Structural hash of the request body, `None` when there is no body.
    pub fn request_hash(&self) -> Option<SchemaHash> {
        self.request_schema.as_ref().map(build_hash)
    }

    /// Structural hash of the response for `status`, if documented.
    pub fn response_hash(&self, status: &str) -> Option<SchemaHash> {
        self.responses.get(status).map(hash_response)
    }

    /// Hashes of every documented response, keyed by status.
    pub fn response_hashes(&self) -> BTreeMap<String, SchemaHash> {
        self.responses
            .iter()
            .map(|(status, body)| (status.clone(), hash_response(body)))
            .collect()
    }

    /// The status the happy-path test expects: lowest explicit 2xx, then
    /// a `2XX` range, then `default`.
    pub fn success_status(&self) -> Option<&str> {
        self.responses
            .keys()
            .find(|s| s.len() == 3 && s.starts_with('2') && s.chars().all(|c| c.is_ascii_digit()))
            .or_else(|| self.responses.keys().find(|s| s.eq_ignore_ascii_case("2XX")))
            .or_else(|| self.responses.keys().find(|s| s.as_str() == "default"))
            .map(String::as_str)
    }

    /// Declared validation-error body, preferring 422 over 400.
    pub fn error_schema(&self) -> Option<(&str, &SchemaRef)> {
        ["422", "400"].into_iter().find_map(|status| {
            self.responses
                .get_key_value(status)
                .and_then(|(k, body)| body.schema().map(|s| (k.as_str(), s)))
        })
    }
}

/// The whole contract, keyed by endpoint id.
#[derive(Debug, Clone, Default)]
pub struct ApiSpec {
    pub title: String,
    pub version: String,
    pub servers: Vec<String>,
    endpoints: BTreeMap<EndpointId, Endpoint>,
}

impl ApiSpec {
    /// Collect endpoints, rejecting two that share an id.
    pub fn from_endpoints<I>(
        title: impl Into<String>,
        version: impl Into<String>,
        servers: Vec<String>,
        endpoints: I,
    ) -> std::result::Result<Self, ContractError>
    where
        I: IntoIterator<Item = Endpoint>,
    {
        let mut map = BTreeMap::new();
        for endpoint in endpoints {
            let id = endpoint.id.clone();
            if map.insert(id.clone(), endpoint).is_some() {
                return Err(ContractError::DuplicateEndpoint {
                    endpoint_id: id.to_string(),
                });
            }
        }
        Ok(Self {
            title: title.into(),
            version: version.into(),
            servers,
            endpoints: map,
        })
    }

    /// Endpoints ordered by path, then method.
    pub fn endpoints(&self) -> impl Iterator<Item = &Endpoint> {
        self.endpoints.values()
    }

    pub fn get(&self, id: &EndpointId) -> Option<&Endpoint> {
        self.endpoints.get(id)
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_endpoint_id_uppercases_method() {
        let id = EndpointId::new("get", "/users");
        assert_eq!(id.method(), "GET");
        assert_eq!(id.to_string(), "GET /users");
        assert_eq!(id, EndpointId::new("GET", "/users"));
    }

    #[test]
    fn test_endpoint_id_orders_by_path_then_method() {
        let mut ids = vec![
            EndpointId::new("POST", "/users"),
            EndpointId::new("GET", "/users/{id}"),
            EndpointId::new("GET", "/users"),
        ];
        ids.sort();
        let rendered: Vec<String> = ids.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            vec!["GET /users", "POST /users", "GET /users/{id}"]
        );
    }

    #[test]
    fn test_endpoint_id_parse() {
        assert_eq!(
            EndpointId::parse("delete /items/{item_id}"),
            Some(EndpointId::new("DELETE", "/items/{item_id}"))
        );
        assert_eq!(EndpointId::parse("GET"), None);
        assert_eq!(EndpointId::parse("GET users"), None);
        assert_eq!(EndpointId::parse("G3T /users"), None);
    }

    #[test]
    fn test_endpoint_id_serializes_as_string() {
        let id = EndpointId::new("PATCH", "/a");
        assert_eq!(serde_json::to_value(&id).unwrap(), json!("PATCH /a"));
        let back: EndpointId = serde_json::from_value(json!("PATCH /a")).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_success_status_prefers_lowest_2xx() {
        let endpoint = Endpoint::new("POST", "/users")
            .with_response("422", ResponseBody::Empty)
            .with_response("default", ResponseBody::Empty)
            .with_response("201", ResponseBody::Empty)
            .with_response("200", ResponseBody::Empty);
        assert_eq!(endpoint.success_status(), Some("200"));

        let only_default = Endpoint::new("GET", "/x").with_response("default", ResponseBody::Empty);
        assert_eq!(only_default.success_status(), Some("default"));
    }

    #[test]
    fn test_error_schema_prefers_422() {
        let endpoint = Endpoint::new("POST", "/users")
            .with_response("400", ResponseBody::Json(SchemaRef::string()))
            .with_response("422", ResponseBody::Json(SchemaRef::integer()));
        let (status, schema) = endpoint.error_schema().unwrap();
        assert_eq!(status, "422");
        assert_eq!(schema.kind_name(), "integer");
    }

    #[test]
    fn test_duplicate_endpoints_rejected() {
        let result = ApiSpec::from_endpoints(
            "t",
            "1",
            vec![],
            vec![Endpoint::new("get", "/a"), Endpoint::new("GET", "/a")],
        );
        assert_eq!(
            result.unwrap_err(),
            ContractError::DuplicateEndpoint {
                endpoint_id: "GET /a".to_string()
            }
        );
    }

    #[test]
    fn test_structural_equality_ignores_enum_order() {
        let a = SchemaRef::enumeration(vec![json!("a"), json!("b")]);
        let b = SchemaRef::enumeration(vec![json!("b"), json!("a")]);
        assert_eq!(a, b);
        assert_ne!(a, SchemaRef::enumeration(vec![json!("a")]));
    }
}
