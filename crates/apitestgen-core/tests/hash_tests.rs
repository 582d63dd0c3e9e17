//! Structural hash invariants.
//!
//! Ordering of keys, enum literals and union variants never changes a hash;
//! any difference in kind, required set or constraint always does.

use apitestgen_core::ir::{build_hash, SchemaKind, SchemaRef};
use apitestgen_core::parse;
use proptest::prelude::*;
use serde_json::{json, Map, Value};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn object_from(fields: &[(String, bool)], reversed: bool) -> SchemaRef {
    let mut pairs: Vec<(String, SchemaRef)> = fields
        .iter()
        .map(|(name, is_int)| {
            let schema = if *is_int {
                SchemaRef::integer()
            } else {
                SchemaRef::string()
            };
            (name.clone(), schema)
        })
        .collect();
    if reversed {
        pairs.reverse();
    }
    let required: Vec<String> = pairs.iter().map(|(n, _)| n.clone()).collect();
    SchemaRef::object(pairs, required)
}

fn contract_with_schema(schema: Value) -> Value {
    json!({
        "openapi": "3.1.0",
        "info": {"title": "t", "version": "1"},
        "paths": {
            "/things": {
                "post": {
                    "requestBody": {"content": {"application/json": {"schema": schema}}},
                    "responses": {"204": {"description": "done"}}
                }
            }
        }
    })
}

fn request_hash_of(schema: Value) -> String {
    let spec = parse(&contract_with_schema(schema)).unwrap();
    let endpoint = spec.endpoints().next().unwrap();
    endpoint.request_hash().unwrap().to_string()
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn prop_property_order_is_irrelevant(
        fields in prop::collection::btree_map("[a-z]{1,8}", any::<bool>(), 0..6)
    ) {
        let fields: Vec<(String, bool)> = fields.into_iter().collect();
        prop_assert_eq!(
            build_hash(&object_from(&fields, false)),
            build_hash(&object_from(&fields, true))
        );
    }

    #[test]
    fn prop_enum_order_is_irrelevant(values in prop::collection::vec("[a-z]{0,6}", 1..8)) {
        let forward: Vec<Value> = values.iter().map(|v| json!(v)).collect();
        let mut backward = forward.clone();
        backward.reverse();
        prop_assert_eq!(
            build_hash(&SchemaRef::enumeration(forward)),
            build_hash(&SchemaRef::enumeration(backward))
        );
    }

    #[test]
    fn prop_minimum_change_always_changes_hash(a in -1000i64..1000, b in -1000i64..1000) {
        prop_assume!(a != b);
        prop_assert_ne!(
            build_hash(&SchemaRef::integer().with_minimum(a as f64)),
            build_hash(&SchemaRef::integer().with_minimum(b as f64))
        );
    }

    #[test]
    fn prop_source_key_order_is_irrelevant(names in prop::collection::btree_set("[a-z]{1,6}", 1..6)) {
        let mut forward = Map::new();
        let mut backward = Map::new();
        for name in &names {
            forward.insert(name.clone(), json!({"type": "string", "maxLength": 5}));
        }
        for name in names.iter().rev() {
            backward.insert(name.clone(), json!({"maxLength": 5, "type": "string"}));
        }
        let required: Vec<&String> = names.iter().collect();
        let mut required_rev = required.clone();
        required_rev.reverse();

        prop_assert_eq!(
            request_hash_of(json!({"type": "object", "properties": forward, "required": required})),
            request_hash_of(json!({"required": required_rev, "properties": backward, "type": "object"}))
        );
    }
}

// ---------------------------------------------------------------------------
// Differences that must be visible
// ---------------------------------------------------------------------------

#[test]
fn test_kind_change_changes_hash() {
    assert_ne!(build_hash(&SchemaRef::integer()), build_hash(&SchemaRef::number()));
    assert_ne!(build_hash(&SchemaRef::string()), build_hash(&SchemaRef::any()));
}

#[test]
fn test_nested_property_type_change_changes_hash() {
    let inner = |s: SchemaRef| SchemaRef::object(vec![("inner", s)], Vec::<&str>::new());
    let a = SchemaRef::object(vec![("outer", inner(SchemaRef::string()))], vec!["outer"]);
    let b = SchemaRef::object(vec![("outer", inner(SchemaRef::boolean()))], vec!["outer"]);
    assert_ne!(build_hash(&a), build_hash(&b));
}

#[test]
fn test_format_and_nullable_change_hash() {
    let base = SchemaRef::string();
    assert_ne!(build_hash(&base), build_hash(&base.clone().with_format("email")));
    assert_ne!(build_hash(&base), build_hash(&base.clone().nullable()));
}

#[test]
fn test_vendor_extensions_and_descriptions_are_ignored() {
    let plain = request_hash_of(json!({"type": "object", "properties": {"a": {"type": "string"}}}));
    let annotated = request_hash_of(json!({
        "type": "object",
        "description": "annotated",
        "x-internal": true,
        "properties": {"a": {"type": "string", "example": "zzz", "title": "A"}}
    }));
    assert_eq!(plain, annotated);
}

#[test]
fn test_3_0_and_3_1_nullable_spellings_hash_alike() {
    let v31 = request_hash_of(json!({"type": ["string", "null"]}));
    let v30 = {
        let mut doc = contract_with_schema(json!({"type": "string", "nullable": true}));
        doc["openapi"] = json!("3.0.3");
        let spec = parse(&doc).unwrap();
        let hash = spec.endpoints().next().unwrap().request_hash().unwrap().to_string();
        hash
    };
    assert_eq!(v31, v30);
}

#[test]
fn test_empty_object_kind_is_object() {
    let empty = SchemaRef::object(Vec::<(&str, SchemaRef)>::new(), Vec::<&str>::new());
    assert!(matches!(empty.kind, SchemaKind::Object { .. }));
    assert_ne!(build_hash(&empty), build_hash(&SchemaRef::null()));
}
