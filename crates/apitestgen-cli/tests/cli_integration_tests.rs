//! CLI integration tests
//!
//! Run the compiled binary against scratch repositories and check output,
//! files and exit codes.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const CONTRACT_YAML: &str = r#"openapi: 3.0.3
info:
  title: Users
  version: 1.0.0
paths:
  /users:
    get:
      responses:
        "200":
          description: ok
          content:
            application/json:
              schema:
                type: object
                required: [id, name]
                properties:
                  id: {type: integer}
                  name: {type: string}
    post:
      requestBody:
        content:
          application/json:
            schema:
              type: object
              required: [name]
              properties:
                name: {type: string}
                age: {type: integer, minimum: 0}
      responses:
        "201":
          description: created
"#;

fn setup() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let spec = temp_dir.path().join("openapi.yaml");
    fs::write(&spec, CONTRACT_YAML).unwrap();
    fs::create_dir_all(temp_dir.path().join("repo")).unwrap();
    (temp_dir, spec)
}

fn run(args: &[&str]) -> Output {
    let cli_bin = env!("CARGO_BIN_EXE_apitestgen-cli");
    Command::new(cli_bin)
        .args(args)
        .output()
        .expect("Failed to execute CLI")
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

// ---------------------------------------------------------------------------
// generate
// ---------------------------------------------------------------------------

#[test]
fn test_cli_generate_creates_files() {
    // Given: a YAML contract and an empty repository
    let (temp_dir, spec) = setup();
    let repo = temp_dir.path().join("repo");

    // When: `apitestgen generate --spec .. --repo ..`
    let output = run(&["generate", "--spec", path_str(&spec), "--repo", path_str(&repo)]);

    // Then: success and two files
    assert!(
        output.status.success(),
        "CLI command should succeed. Stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Created: 2"), "stdout: {stdout}");
    assert!(repo.join("tests/api/test_get_users.py").exists());
    assert!(repo.join("tests/api/test_post_users.py").exists());
}

#[test]
fn test_cli_generate_json_summary() {
    let (temp_dir, spec) = setup();
    let repo = temp_dir.path().join("repo");

    let output = run(&[
        "generate",
        "--spec",
        path_str(&spec),
        "--repo",
        path_str(&repo),
        "--dry-run",
        "--json",
    ]);

    assert_eq!(output.status.code(), Some(0));
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["dry_run"], true);
    assert_eq!(summary["created"].as_array().unwrap().len(), 2);
    assert!(!repo.join("tests").exists());
}

#[test]
fn test_cli_log_format_json_is_accepted() {
    let (temp_dir, spec) = setup();
    let repo = temp_dir.path().join("repo");

    let output = run(&[
        "--log-format",
        "json",
        "generate",
        "--spec",
        path_str(&spec),
        "--repo",
        path_str(&repo),
    ]);

    assert!(output.status.success());
}

// ---------------------------------------------------------------------------
// diff
// ---------------------------------------------------------------------------

#[test]
fn test_cli_diff_after_generate_is_in_sync() {
    let (temp_dir, spec) = setup();
    let repo = temp_dir.path().join("repo");
    let generated = run(&["generate", "--spec", path_str(&spec), "--repo", path_str(&repo)]);
    assert!(generated.status.success());

    let output = run(&[
        "diff",
        "--spec",
        path_str(&spec),
        "--repo",
        path_str(&repo),
        "--json",
    ]);

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["result"]["to_skip"].as_array().unwrap().len(), 2);
    assert_eq!(report["result"]["to_create"].as_array().unwrap().len(), 0);

    let markdown = run(&["diff", "--spec", path_str(&spec), "--repo", path_str(&repo)]);
    let stdout = String::from_utf8_lossy(&markdown.stdout);
    assert!(stdout.contains("## Contract Diff"));
}

// ---------------------------------------------------------------------------
// clean
// ---------------------------------------------------------------------------

#[test]
fn test_cli_clean_removes_generated_files() {
    let (temp_dir, spec) = setup();
    let repo = temp_dir.path().join("repo");
    run(&["generate", "--spec", path_str(&spec), "--repo", path_str(&repo)]);

    let dry = run(&["clean", "--repo", path_str(&repo), "--dry-run"]);
    assert!(dry.status.success());
    assert!(repo.join("tests/api/test_get_users.py").exists());

    let output = run(&["clean", "--repo", path_str(&repo)]);
    assert!(output.status.success());
    assert!(!repo.join("tests/api/test_get_users.py").exists());
    assert!(!repo.join("tests/api/report.json").exists());
}

// ---------------------------------------------------------------------------
// Exit codes
// ---------------------------------------------------------------------------

#[test]
fn test_cli_missing_spec_exits_1() {
    let (temp_dir, _spec) = setup();
    let repo = temp_dir.path().join("repo");
    let missing = temp_dir.path().join("missing.yaml");

    let output = run(&["generate", "--spec", path_str(&missing), "--repo", path_str(&repo)]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error: "), "stderr: {stderr}");
}

#[test]
fn test_cli_write_failures_exit_2() {
    // Given: a regular file where the test directory should be
    let (temp_dir, spec) = setup();
    let repo = temp_dir.path().join("repo");
    fs::create_dir_all(repo.join("tests")).unwrap();
    fs::write(repo.join("tests/api"), "not a directory").unwrap();

    let output = run(&["generate", "--spec", path_str(&spec), "--repo", path_str(&repo)]);

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed: create"), "stderr: {stderr}");
}

#[test]
fn test_cli_bad_duplicate_policy_is_rejected() {
    let (temp_dir, spec) = setup();
    let repo = temp_dir.path().join("repo");

    let output = run(&[
        "diff",
        "--spec",
        path_str(&spec),
        "--repo",
        path_str(&repo),
        "--duplicate-policy",
        "newest",
    ]);

    assert!(!output.status.success());
}
