//! Builds the canonical IR from a raw OpenAPI 3.x document.

use crate::errors::{ContractError, Result};
use crate::ir::{ApiSpec, Constraints, Endpoint, EndpointId, ResponseBody, SchemaKind, SchemaRef};
use crate::parser::document::{
    BoolOrNumber, MediaType, OpenApiDocument, Operation, RefOr, RequestBody, Response, Schema,
    SecurityRequirement, Server,
};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

const HTTP_METHODS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";
const RESPONSE_REF_PREFIX: &str = "#/components/responses/";
const REQUEST_BODY_REF_PREFIX: &str = "#/components/requestBodies/";

type ContractResult<T> = std::result::Result<T, ContractError>;

/// Parse an already-loaded OpenAPI document into an [`ApiSpec`].
///
/// # Errors
///
/// - `UnsupportedVersion` when `openapi` is missing or not `3.x`
/// - `InvalidDocument` when the document does not have the OpenAPI shape
/// - `UnresolvedReference` for a `$ref` outside the local components
/// - `UnsupportedContentType` for a body with no JSON media type
/// - `UnsupportedConstruct` for an `allOf` mixing non-object parts
/// - `DuplicateEndpoint` when two method keys normalise to the same method
pub fn parse(document: &Value) -> Result<ApiSpec> {
    Ok(parse_contract(document)?)
}

fn parse_contract(document: &Value) -> ContractResult<ApiSpec> {
    let version = check_version(document)?;

    // Unquoted YAML versions load as numbers; the typed pass expects text.
    let mut normalized = document.clone();
    if let Some(slot) = normalized.get_mut("openapi") {
        *slot = Value::String(version);
    }
    let doc: OpenApiDocument =
        serde_json::from_value(normalized).map_err(|e| ContractError::InvalidDocument {
            reason: e.to_string(),
        })?;

    let root_servers = server_urls(&doc.servers);
    let root_security = doc.security.as_deref();
    let mut endpoints = Vec::new();

    for (path, item) in &doc.paths {
        let path_servers = match item.get("servers") {
            Some(raw) => Some(deserialize::<Vec<Server>>(raw, &format!("servers of {path}"))?),
            None => None,
        };

        let mut seen: BTreeSet<String> = BTreeSet::new();
        for (key, raw_operation) in item {
            let lowered = key.to_ascii_lowercase();
            if !HTTP_METHODS.contains(&lowered.as_str()) {
                continue;
            }
            let id = EndpointId::new(&lowered, path.clone());
            if !seen.insert(lowered) {
                return Err(ContractError::DuplicateEndpoint {
                    endpoint_id: id.to_string(),
                });
            }

            let operation: Operation = deserialize(raw_operation, &format!("operation {id}"))?;
            let servers = operation
                .servers
                .as_deref()
                .or(path_servers.as_deref())
                .map(server_urls)
                .unwrap_or_else(|| root_servers.clone());
            endpoints.push(build_endpoint(
                &doc,
                id,
                &operation,
                root_security,
                servers,
            )?);
        }
    }

    let spec = ApiSpec::from_endpoints(doc.info.title, doc.info.version, root_servers, endpoints)?;
    tracing::debug!(endpoints = spec.len(), "parsed contract");
    Ok(spec)
}

/// The declared `3.x` version as text.
fn check_version(document: &Value) -> ContractResult<String> {
    let Some(object) = document.as_object() else {
        return Err(ContractError::InvalidDocument {
            reason: "document root is not a mapping".to_string(),
        });
    };
    let version = match object.get("openapi") {
        Some(Value::String(v)) => v.clone(),
        Some(other) => other.to_string(),
        None => object
            .get("swagger")
            .map(|v| format!("swagger {}", v.as_str().unwrap_or("?")))
            .unwrap_or_else(|| "<missing>".to_string()),
    };
    if version.starts_with("3.") {
        Ok(version)
    } else {
        Err(ContractError::UnsupportedVersion { version })
    }
}

fn deserialize<T: serde::de::DeserializeOwned>(raw: &Value, location: &str) -> ContractResult<T> {
    serde_json::from_value(raw.clone()).map_err(|e| ContractError::InvalidDocument {
        reason: format!("{location}: {e}"),
    })
}

fn server_urls(servers: &[Server]) -> Vec<String> {
    servers.iter().map(|s| s.url.clone()).collect()
}

/// Scheme names required by the effective security requirements. Any empty
/// requirement makes authentication optional, so nothing is required.
fn security_schemes(requirements: Option<&[SecurityRequirement]>) -> BTreeSet<String> {
    let Some(requirements) = requirements else {
        return BTreeSet::new();
    };
    if requirements.iter().any(|r| r.is_empty()) {
        return BTreeSet::new();
    }
    requirements
        .iter()
        .flat_map(|r| r.keys().cloned())
        .collect()
}

fn build_endpoint(
    doc: &OpenApiDocument,
    id: EndpointId,
    operation: &Operation,
    root_security: Option<&[SecurityRequirement]>,
    servers: Vec<String>,
) -> ContractResult<Endpoint> {
    let mut resolver = SchemaResolver::new(&doc.components.schemas);

    let request_schema = match &operation.request_body {
        Some(body) => {
            let body = lookup_request_body(doc, body)?;
            let location = format!("request body of {id}");
            match select_json(body.content.as_ref(), &id, &location)? {
                None => None,
                Some(media) => Some(resolver.resolve_media(media, &location)?),
            }
        }
        None => None,
    };

    let mut responses = BTreeMap::new();
    for (status, response) in &operation.responses {
        let response = lookup_response(doc, response)?;
        let location = format!("response {status} of {id}");
        let body = match select_json(response.content.as_ref(), &id, &location)? {
            None => ResponseBody::Empty,
            Some(media) => ResponseBody::Json(resolver.resolve_media(media, &location)?),
        };
        responses.insert(status.clone(), body);
    }

    let security = security_schemes(operation.security.as_deref().or(root_security));

    Ok(Endpoint {
        id,
        operation_id: operation.operation_id.clone(),
        summary: operation.summary.clone(),
        request_schema,
        responses,
        security,
        servers,
    })
}

fn lookup_request_body<'a>(
    doc: &'a OpenApiDocument,
    body: &'a RefOr<RequestBody>,
) -> ContractResult<&'a RequestBody> {
    match body {
        RefOr::Item(body) => Ok(body),
        RefOr::Ref { reference } => {
            let name = component_name(reference, REQUEST_BODY_REF_PREFIX)?;
            match doc.components.request_bodies.get(&name) {
                Some(RefOr::Item(body)) => Ok(body),
                _ => Err(unresolved(reference)),
            }
        }
    }
}

fn lookup_response<'a>(
    doc: &'a OpenApiDocument,
    response: &'a RefOr<Response>,
) -> ContractResult<&'a Response> {
    match response {
        RefOr::Item(response) => Ok(response),
        RefOr::Ref { reference } => {
            let name = component_name(reference, RESPONSE_REF_PREFIX)?;
            match doc.components.responses.get(&name) {
                Some(RefOr::Item(response)) => Ok(response),
                _ => Err(unresolved(reference)),
            }
        }
    }
}

fn is_json_media_type(media_type: &str) -> bool {
    let base = media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    base == "application/json" || base.ends_with("+json")
}

/// Pick the JSON media type of a body. `Ok(None)` means the body is empty.
fn select_json<'a>(
    content: Option<&'a BTreeMap<String, MediaType>>,
    id: &EndpointId,
    location: &str,
) -> ContractResult<Option<&'a MediaType>> {
    let Some(content) = content.filter(|c| !c.is_empty()) else {
        return Ok(None);
    };
    let exact = content
        .iter()
        .find(|(k, _)| k.split(';').next().unwrap_or_default().trim() == "application/json");
    match exact.or_else(|| content.iter().find(|(k, _)| is_json_media_type(k))) {
        Some((_, media)) => Ok(Some(media)),
        None => Err(ContractError::UnsupportedContentType {
            endpoint_id: id.to_string(),
            location: location.to_string(),
            media_types: content.keys().cloned().collect(),
        }),
    }
}

fn component_name(reference: &str, prefix: &str) -> ContractResult<String> {
    match reference.strip_prefix(prefix) {
        Some(name) if !name.is_empty() && !name.contains('/') => {
            Ok(name.replace("~1", "/").replace("~0", "~"))
        }
        _ => Err(unresolved(reference)),
    }
}

fn unresolved(reference: &str) -> ContractError {
    ContractError::UnresolvedReference {
        reference: reference.to_string(),
    }
}

/// Resolves `$ref`s against `components/schemas` while converting to the IR.
///
/// The stack holds the component names currently being expanded; meeting
/// one again yields a `Recursive` placeholder instead of looping.
struct SchemaResolver<'a> {
    schemas: &'a BTreeMap<String, Schema>,
    stack: Vec<String>,
}

impl<'a> SchemaResolver<'a> {
    fn new(schemas: &'a BTreeMap<String, Schema>) -> Self {
        Self {
            schemas,
            stack: Vec::new(),
        }
    }

    fn resolve_media(&mut self, media: &MediaType, location: &str) -> ContractResult<SchemaRef> {
        match &media.schema {
            Some(schema) => self.resolve(schema, location),
            None => Ok(SchemaRef::any()),
        }
    }

    fn resolve(&mut self, schema: &Schema, location: &str) -> ContractResult<SchemaRef> {
        if let Some(reference) = &schema.reference {
            return self.resolve_reference(reference);
        }
        if let Some(parts) = &schema.all_of {
            return self.resolve_all_of(schema, parts, location);
        }
        if let Some(variants) = &schema.any_of {
            return self.resolve_union(schema, variants, &format!("{location}/anyOf"));
        }
        if let Some(variants) = &schema.one_of {
            return self.resolve_union(schema, variants, &format!("{location}/oneOf"));
        }

        let (kind, type_nullable) = self.resolve_kind(schema, location)?;
        let mut node = SchemaRef::new(kind);
        apply_annotations(&mut node, schema);
        node.nullable |= type_nullable;
        Ok(node)
    }

    fn resolve_reference(&mut self, reference: &str) -> ContractResult<SchemaRef> {
        let name = component_name(reference, SCHEMA_REF_PREFIX)?;
        if self.stack.contains(&name) {
            return Ok(SchemaRef::new(SchemaKind::Recursive { name }));
        }
        let target = self.schemas.get(&name).ok_or_else(|| unresolved(reference))?;
        self.stack.push(name.clone());
        let resolved = self.resolve(target, &format!("{SCHEMA_REF_PREFIX}{name}"));
        self.stack.pop();
        resolved
    }

    fn resolve_kind(
        &mut self,
        schema: &Schema,
        location: &str,
    ) -> ContractResult<(SchemaKind, bool)> {
        if let Some(values) = &schema.enum_values {
            let nullable = values.iter().any(Value::is_null);
            return Ok((SchemaKind::Enum { values: values.clone() }, nullable));
        }
        if let Some(value) = &schema.const_value {
            return Ok((
                SchemaKind::Enum {
                    values: vec![value.clone()],
                },
                false,
            ));
        }

        let names = schema
            .schema_type
            .as_ref()
            .map(|t| t.names())
            .unwrap_or_default();
        let nullable = names.contains(&"null");
        let concrete: Vec<&str> = names.into_iter().filter(|n| *n != "null").collect();

        let kind = match concrete.as_slice() {
            [] if nullable => SchemaKind::Null,
            [] if schema.properties.is_some() => self.object_kind(schema, location)?,
            [] if schema.items.is_some() => self.array_kind(schema, location)?,
            [] => SchemaKind::Any,
            [single] => self.kind_for_type(single, schema, location)?,
            several => {
                let mut variants = Vec::with_capacity(several.len());
                for name in several {
                    let mut variant = SchemaRef::new(self.kind_for_type(name, schema, location)?);
                    apply_annotations(&mut variant, schema);
                    variants.push(variant);
                }
                SchemaKind::Union { variants }
            }
        };
        Ok((kind, nullable))
    }

    fn kind_for_type(
        &mut self,
        name: &str,
        schema: &Schema,
        location: &str,
    ) -> ContractResult<SchemaKind> {
        Ok(match name {
            "object" => self.object_kind(schema, location)?,
            "array" => self.array_kind(schema, location)?,
            "string" => SchemaKind::String,
            "number" => SchemaKind::Number,
            "integer" => SchemaKind::Integer,
            "boolean" => SchemaKind::Boolean,
            other => {
                return Err(ContractError::UnsupportedConstruct {
                    location: location.to_string(),
                    reason: format!("unknown type '{other}'"),
                })
            }
        })
    }

    fn object_kind(&mut self, schema: &Schema, location: &str) -> ContractResult<SchemaKind> {
        let mut properties = BTreeMap::new();
        if let Some(props) = &schema.properties {
            for (name, child) in props {
                let child_location = format!("{location}/properties/{name}");
                properties.insert(name.clone(), self.resolve(child, &child_location)?);
            }
        }
        let required = schema
            .required
            .iter()
            .flatten()
            .cloned()
            .collect();
        Ok(SchemaKind::Object {
            properties,
            required,
        })
    }

    fn array_kind(&mut self, schema: &Schema, location: &str) -> ContractResult<SchemaKind> {
        let items = match &schema.items {
            Some(items) => Some(Box::new(self.resolve(items, &format!("{location}/items"))?)),
            None => None,
        };
        Ok(SchemaKind::Array { items })
    }

    /// Flatten `allOf` into one object. A single non-object part (plus
    /// nothing else) passes through unchanged.
    fn resolve_all_of(
        &mut self,
        schema: &Schema,
        parts: &[Schema],
        location: &str,
    ) -> ContractResult<SchemaRef> {
        let mut resolved = Vec::with_capacity(parts.len());
        for (index, part) in parts.iter().enumerate() {
            resolved.push(self.resolve(part, &format!("{location}/allOf/{index}"))?);
        }

        if resolved.len() == 1 && schema.properties.is_none() && resolved[0].properties().is_none() {
            let mut single = resolved.remove(0);
            single.nullable |= schema.nullable.unwrap_or(false);
            return Ok(single);
        }

        let mut properties = BTreeMap::new();
        let mut required = BTreeSet::new();
        for part in resolved {
            match part.kind {
                SchemaKind::Object {
                    properties: p,
                    required: r,
                } => {
                    properties.extend(p);
                    required.extend(r);
                }
                SchemaKind::Any => {}
                _ => {
                    return Err(ContractError::UnsupportedConstruct {
                        location: location.to_string(),
                        reason: format!("allOf combines a non-object '{}' part", part.kind_name()),
                    })
                }
            }
        }

        if let SchemaKind::Object {
            properties: own,
            required: own_required,
        } = self.object_kind(schema, location)?
        {
            properties.extend(own);
            required.extend(own_required);
        }

        let mut node = SchemaRef::new(SchemaKind::Object {
            properties,
            required,
        });
        node.nullable = schema.nullable.unwrap_or(false);
        node.read_only = schema.read_only.unwrap_or(false);
        node.write_only = schema.write_only.unwrap_or(false);
        Ok(node)
    }

    /// `anyOf`/`oneOf`. One concrete variant plus `null` collapses to a
    /// nullable version of that variant. `location` ends with the keyword.
    fn resolve_union(
        &mut self,
        schema: &Schema,
        variants: &[Schema],
        location: &str,
    ) -> ContractResult<SchemaRef> {
        let mut resolved = Vec::with_capacity(variants.len());
        for (index, variant) in variants.iter().enumerate() {
            resolved.push(self.resolve(variant, &format!("{location}/{index}"))?);
        }

        let has_null = resolved
            .iter()
            .any(|v| matches!(v.kind, SchemaKind::Null));
        let mut concrete: Vec<SchemaRef> = resolved
            .into_iter()
            .filter(|v| !matches!(v.kind, SchemaKind::Null))
            .collect();

        let mut node = match concrete.len() {
            0 => SchemaRef::null(),
            1 => {
                let mut only = concrete.remove(0);
                only.nullable |= has_null;
                only
            }
            _ => {
                let mut union = SchemaRef::new(SchemaKind::Union { variants: concrete });
                union.nullable = has_null;
                union
            }
        };
        node.nullable |= schema.nullable.unwrap_or(false);
        Ok(node)
    }
}

/// Copy format, flags and bounds from the document node.
fn apply_annotations(node: &mut SchemaRef, schema: &Schema) {
    node.format = schema.format.clone();
    node.nullable = schema.nullable.unwrap_or(false);
    node.read_only = schema.read_only.unwrap_or(false);
    node.write_only = schema.write_only.unwrap_or(false);
    node.constraints = constraints_of(schema);
}

fn constraints_of(schema: &Schema) -> Constraints {
    let mut constraints = Constraints {
        minimum: schema.minimum,
        maximum: schema.maximum,
        min_length: schema.min_length,
        max_length: schema.max_length,
        min_items: schema.min_items,
        max_items: schema.max_items,
        pattern: schema.pattern.clone(),
        ..Constraints::default()
    };
    match schema.exclusive_minimum {
        Some(BoolOrNumber::Bool(flag)) => constraints.exclusive_minimum = flag,
        Some(BoolOrNumber::Number(bound)) => {
            constraints.minimum = Some(bound);
            constraints.exclusive_minimum = true;
        }
        None => {}
    }
    match schema.exclusive_maximum {
        Some(BoolOrNumber::Bool(flag)) => constraints.exclusive_maximum = flag,
        Some(BoolOrNumber::Number(bound)) => {
            constraints.maximum = Some(bound);
            constraints.exclusive_maximum = true;
        }
        None => {}
    }
    constraints
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_json_media_type() {
        assert!(is_json_media_type("application/json"));
        assert!(is_json_media_type("application/json; charset=utf-8"));
        assert!(is_json_media_type("application/problem+json"));
        assert!(!is_json_media_type("application/xml"));
        assert!(!is_json_media_type("text/plain"));
    }

    #[test]
    fn test_component_name_decodes_pointer_escapes() {
        assert_eq!(
            component_name("#/components/schemas/a~1b~0c", SCHEMA_REF_PREFIX).unwrap(),
            "a/b~c"
        );
        assert!(component_name("other.yaml#/User", SCHEMA_REF_PREFIX).is_err());
        assert!(component_name("#/components/schemas/", SCHEMA_REF_PREFIX).is_err());
    }

    #[test]
    fn test_security_optional_when_empty_requirement_present() {
        let mut bearer = SecurityRequirement::new();
        bearer.insert("bearerAuth".to_string(), vec![]);
        let requirements = vec![bearer.clone(), SecurityRequirement::new()];
        assert!(security_schemes(Some(&requirements)).is_empty());
        assert_eq!(
            security_schemes(Some(&[bearer])),
            BTreeSet::from(["bearerAuth".to_string()])
        );
    }

    #[test]
    fn test_exclusive_bounds_3_1_style() {
        let schema: Schema =
            serde_json::from_value(json!({"type": "number", "exclusiveMinimum": 5})).unwrap();
        let c = constraints_of(&schema);
        assert_eq!(c.minimum, Some(5.0));
        assert!(c.exclusive_minimum);
    }

    fn users_post(schema: Value) -> Value {
        json!({
            "openapi": "3.0.3",
            "info": {"title": "t", "version": "1"},
            "paths": {"/users": {"post": {
                "requestBody": {"content": {"application/json": {"schema": schema}}},
                "responses": {"201": {"description": "created"}}
            }}}
        })
    }

    #[test]
    fn test_union_location_names_its_keyword() {
        let bad_variant = json!({"allOf": [{"type": "string"}, {"type": "object"}]});
        for keyword in ["oneOf", "anyOf"] {
            let document = users_post(json!({ keyword: [bad_variant.clone()] }));
            match parse_contract(&document) {
                Err(ContractError::UnsupportedConstruct { location, .. }) => {
                    assert!(location.ends_with(&format!("/{keyword}/0")), "{location}");
                }
                other => panic!("expected UnsupportedConstruct, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_numeric_openapi_version_is_accepted() {
        // Given: `openapi: 3.0` written unquoted in YAML
        let mut document = users_post(json!({"type": "object"}));
        document["openapi"] = json!(3.0);

        // When
        let spec = parse_contract(&document).unwrap();

        // Then
        assert_eq!(spec.len(), 1);
        assert_eq!(check_version(&json!({"openapi": 3.1})).unwrap(), "3.1");
        assert!(matches!(
            check_version(&json!({"openapi": 2})),
            Err(ContractError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn test_version_check() {
        assert!(check_version(&json!({"openapi": "3.0.3"})).is_ok());
        assert!(check_version(&json!({"openapi": "3.1.0"})).is_ok());
        assert_eq!(
            check_version(&json!({"swagger": "2.0"})),
            Err(ContractError::UnsupportedVersion {
                version: "swagger 2.0".to_string()
            })
        );
        assert!(matches!(
            check_version(&json!([])),
            Err(ContractError::InvalidDocument { .. })
        ));
    }
}
