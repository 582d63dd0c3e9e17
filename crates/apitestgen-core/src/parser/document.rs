//! OpenAPI 3.x document shape for serde deserialization.
//!
//! Only the subset the IR needs is modelled; everything else (descriptions,
//! examples, `x-*` extensions, parameters) is ignored by serde.

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Deserialize)]
pub struct OpenApiDocument {
    pub openapi: String,
    #[serde(default)]
    pub info: Info,
    #[serde(default)]
    pub servers: Vec<Server>,
    /// Path items stay raw: method keys are matched case-insensitively.
    #[serde(default)]
    pub paths: BTreeMap<String, BTreeMap<String, Value>>,
    #[serde(default)]
    pub components: Components,
    #[serde(default)]
    pub security: Option<Vec<SecurityRequirement>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Info {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub version: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    pub url: String,
}

/// Scheme name to scopes. An empty requirement means "no auth needed".
pub type SecurityRequirement = BTreeMap<String, Vec<String>>;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    #[serde(default)]
    pub schemas: BTreeMap<String, Schema>,
    #[serde(default)]
    pub responses: BTreeMap<String, RefOr<Response>>,
    #[serde(default)]
    pub request_bodies: BTreeMap<String, RefOr<RequestBody>>,
}

/// Either a `$ref` or an inline object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RefOr<T> {
    Ref {
        #[serde(rename = "$ref")]
        reference: String,
    },
    Item(T),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub request_body: Option<RefOr<RequestBody>>,
    #[serde(default)]
    pub responses: BTreeMap<String, RefOr<Response>>,
    pub security: Option<Vec<SecurityRequirement>>,
    pub servers: Option<Vec<Server>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RequestBody {
    pub content: Option<BTreeMap<String, MediaType>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Response {
    pub content: Option<BTreeMap<String, MediaType>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaType {
    pub schema: Option<Schema>,
}

/// JSON Schema node as it appears in the document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "$ref")]
    pub reference: Option<String>,
    #[serde(rename = "type")]
    pub schema_type: Option<SchemaType>,
    pub format: Option<String>,
    pub properties: Option<BTreeMap<String, Schema>>,
    pub required: Option<Vec<String>>,
    pub items: Option<Box<Schema>>,
    #[serde(rename = "enum")]
    pub enum_values: Option<Vec<Value>>,
    #[serde(rename = "const")]
    pub const_value: Option<Value>,
    pub all_of: Option<Vec<Schema>>,
    pub any_of: Option<Vec<Schema>>,
    pub one_of: Option<Vec<Schema>>,
    /// OpenAPI 3.0 nullable flag (3.1 uses type arrays instead)
    pub nullable: Option<bool>,
    pub read_only: Option<bool>,
    pub write_only: Option<bool>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub exclusive_minimum: Option<BoolOrNumber>,
    pub exclusive_maximum: Option<BoolOrNumber>,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
    pub pattern: Option<String>,
}

/// `type` is a single name, or a list of names in OpenAPI 3.1.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SchemaType {
    Single(String),
    Multiple(Vec<String>),
}

impl SchemaType {
    pub fn names(&self) -> Vec<&str> {
        match self {
            SchemaType::Single(name) => vec![name.as_str()],
            SchemaType::Multiple(names) => names.iter().map(String::as_str).collect(),
        }
    }
}

/// 3.0 uses a boolean flag next to `minimum`; 3.1 carries the bound itself.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
pub enum BoolOrNumber {
    Bool(bool),
    Number(f64),
}
