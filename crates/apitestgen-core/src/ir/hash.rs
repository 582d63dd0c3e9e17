//! Structural hashing of IR schema trees.
//!
//! A schema is first reduced to a canonical JSON form:
//! - mapping keys in sorted order (built from `BTreeMap`s)
//! - enum literals and union variants sorted by their canonical text
//! - only the fields the IR models (vendor extensions never reach here)
//!
//! The digest is the hex SHA-256 of the compact serialization of that form,
//! so `hash(a) == hash(b)` exactly when `a == b` structurally.

use crate::ir::model::{Constraints, ResponseBody, SchemaKind, SchemaRef};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;

/// Hex-encoded SHA-256 structural digest (64 lowercase characters).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaHash(String);

impl SchemaHash {
    /// Parse a persisted digest. Uppercase hex is accepted and normalised.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.len() == 64 && s.chars().all(|c| c.is_ascii_hexdigit()) {
            Some(Self(s.to_ascii_lowercase()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 characters, for human-facing output.
    pub fn short(&self) -> &str {
        &self.0[..12]
    }
}

impl fmt::Display for SchemaHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compute the structural hash of a schema tree. Pure and total.
pub fn build_hash(schema: &SchemaRef) -> SchemaHash {
    hash_value(&canonical_form(schema))
}

/// Hash of a documented response. An empty body hashes differently from
/// every schema, including `null`.
pub fn hash_response(body: &ResponseBody) -> SchemaHash {
    match body {
        ResponseBody::Empty => hash_value(&Value::String("<empty-body>".to_string())),
        ResponseBody::Json(schema) => build_hash(schema),
    }
}

/// Hex SHA-256 of an arbitrary string.
pub fn hash_string(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

fn hash_value(value: &Value) -> SchemaHash {
    SchemaHash(hash_string(&value.to_string()))
}

/// Canonical JSON form of a schema tree.
pub fn canonical_form(schema: &SchemaRef) -> Value {
    let mut fields: BTreeMap<&'static str, Value> = BTreeMap::new();
    fields.insert("kind", Value::from(schema.kind_name()));

    match &schema.kind {
        SchemaKind::Object {
            properties,
            required,
        } => {
            let props: Map<String, Value> = properties
                .iter()
                .map(|(name, child)| (name.clone(), canonical_form(child)))
                .collect();
            fields.insert("properties", Value::Object(props));
            fields.insert(
                "required",
                Value::Array(required.iter().cloned().map(Value::String).collect()),
            );
        }
        SchemaKind::Array { items } => {
            fields.insert(
                "items",
                items
                    .as_deref()
                    .map(canonical_form)
                    .unwrap_or(Value::Null),
            );
        }
        SchemaKind::Enum { values } => {
            fields.insert("values", sorted_unique(values.iter().map(canonical_literal)));
        }
        SchemaKind::Union { variants } => {
            fields.insert("variants", sorted_unique(variants.iter().map(canonical_form)));
        }
        SchemaKind::Recursive { name } => {
            fields.insert("name", Value::from(name.as_str()));
        }
        SchemaKind::String
        | SchemaKind::Number
        | SchemaKind::Integer
        | SchemaKind::Boolean
        | SchemaKind::Null
        | SchemaKind::Any => {}
    }

    if let Some(format) = &schema.format {
        fields.insert("format", Value::from(format.as_str()));
    }
    if !schema.constraints.is_empty() {
        fields.insert("constraints", canonical_constraints(&schema.constraints));
    }
    if schema.nullable {
        fields.insert("nullable", Value::Bool(true));
    }
    if schema.read_only {
        fields.insert("read_only", Value::Bool(true));
    }
    if schema.write_only {
        fields.insert("write_only", Value::Bool(true));
    }

    Value::Object(
        fields
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
    )
}

fn canonical_constraints(c: &Constraints) -> Value {
    let mut fields: BTreeMap<&'static str, Value> = BTreeMap::new();
    if let Some(v) = c.minimum {
        fields.insert("minimum", Value::from(v));
    }
    if let Some(v) = c.maximum {
        fields.insert("maximum", Value::from(v));
    }
    if c.exclusive_minimum {
        fields.insert("exclusive_minimum", Value::Bool(true));
    }
    if c.exclusive_maximum {
        fields.insert("exclusive_maximum", Value::Bool(true));
    }
    if let Some(v) = c.min_length {
        fields.insert("min_length", Value::from(v));
    }
    if let Some(v) = c.max_length {
        fields.insert("max_length", Value::from(v));
    }
    if let Some(v) = c.min_items {
        fields.insert("min_items", Value::from(v));
    }
    if let Some(v) = c.max_items {
        fields.insert("max_items", Value::from(v));
    }
    if let Some(v) = &c.pattern {
        fields.insert("pattern", Value::from(v.as_str()));
    }
    Value::Object(
        fields
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
    )
}

/// Literal with object keys re-sorted, independent of how the map type
/// orders its entries.
fn canonical_literal(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<&String, Value> =
                map.iter().map(|(k, v)| (k, canonical_literal(v))).collect();
            Value::Object(sorted.into_iter().map(|(k, v)| (k.clone(), v)).collect())
        }
        Value::Array(items) => Value::Array(items.iter().map(canonical_literal).collect()),
        other => other.clone(),
    }
}

fn sorted_unique(values: impl Iterator<Item = Value>) -> Value {
    let by_text: BTreeMap<String, Value> = values.map(|v| (v.to_string(), v)).collect();
    Value::Array(by_text.into_values().collect())
}
