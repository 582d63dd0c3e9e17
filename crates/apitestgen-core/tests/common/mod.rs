use apitestgen_core::header::HeaderFields;
use apitestgen_core::{parse, ApiSpec, TestFileMetadata};
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};

/// `GET /users` and `POST /users` with `age` bounded below by `age_minimum`.
#[allow(dead_code)]
pub fn users_contract(age_minimum: i64) -> Value {
    json!({
        "openapi": "3.0.3",
        "info": {"title": "Users", "version": "1.0.0"},
        "paths": {
            "/users": {
                "get": {
                    "responses": {
                        "200": {
                            "description": "ok",
                            "content": {"application/json": {"schema": {"$ref": "#/components/schemas/User"}}}
                        }
                    }
                },
                "post": {
                    "requestBody": {
                        "content": {"application/json": {"schema": {"$ref": "#/components/schemas/NewUser"}}}
                    },
                    "responses": {
                        "201": {
                            "description": "created",
                            "content": {"application/json": {"schema": {"$ref": "#/components/schemas/User"}}}
                        }
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "User": {
                    "type": "object",
                    "required": ["id", "name"],
                    "properties": {
                        "id": {"type": "integer"},
                        "name": {"type": "string"}
                    }
                },
                "NewUser": {
                    "type": "object",
                    "required": ["name"],
                    "properties": {
                        "name": {"type": "string"},
                        "age": {"type": "integer", "minimum": age_minimum}
                    }
                }
            }
        }
    })
}

#[allow(dead_code)]
pub fn users_spec(age_minimum: i64) -> ApiSpec {
    parse(&users_contract(age_minimum)).unwrap()
}

/// Metadata as the scanner would recover it for every endpoint of `spec`.
#[allow(dead_code)]
pub fn metadata_for(spec: &ApiSpec) -> Vec<TestFileMetadata> {
    let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    spec.endpoints()
        .map(|e| {
            let path = format!("tests/api/{}", apitestgen_core::render::file_name_for(&e.id, "py"));
            HeaderFields::for_endpoint(e, at).into_metadata(path)
        })
        .collect()
}
