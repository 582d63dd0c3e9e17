#![allow(dead_code)]

use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const GET_USERS_FILE: &str = "tests/api/test_get_users.py";
pub const POST_USERS_FILE: &str = "tests/api/test_post_users.py";

/// `GET /users` and `POST /users` with `age` bounded below by `age_minimum`.
pub fn users_contract(age_minimum: i64) -> Value {
    json!({
        "openapi": "3.0.3",
        "info": {"title": "Users", "version": "1.0.0"},
        "servers": [{"url": "https://users.example.com"}],
        "paths": {
            "/users": {
                "get": {
                    "responses": {
                        "200": {
                            "description": "ok",
                            "content": {"application/json": {"schema": {
                                "type": "object",
                                "required": ["id", "name"],
                                "properties": {
                                    "id": {"type": "integer"},
                                    "name": {"type": "string"}
                                }
                            }}}
                        }
                    }
                },
                "post": {
                    "requestBody": {
                        "content": {"application/json": {"schema": {
                            "type": "object",
                            "required": ["name"],
                            "properties": {
                                "name": {"type": "string"},
                                "age": {"type": "integer", "minimum": age_minimum}
                            }
                        }}}
                    },
                    "responses": {
                        "201": {"description": "created"}
                    }
                }
            }
        }
    })
}

/// A repository directory plus a contract file living outside of it.
pub struct Fixture {
    pub repo: TempDir,
    pub contracts: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            repo: TempDir::new().unwrap(),
            contracts: TempDir::new().unwrap(),
        }
    }

    pub fn repo_path(&self) -> &Path {
        self.repo.path()
    }

    /// Write `contract` as JSON and return its path.
    pub fn write_contract(&self, contract: &Value) -> PathBuf {
        let path = self.contracts.path().join("openapi.json");
        fs::write(&path, serde_json::to_string_pretty(contract).unwrap()).unwrap();
        path
    }

    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.repo.path().join(rel)).unwrap()
    }

    pub fn write(&self, rel: &str, content: &str) {
        let path = self.repo.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.repo.path().join(rel).exists()
    }
}
