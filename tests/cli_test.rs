/// CLI integration tests
mod common;

use std::fs;

use assert_cmd::Command;
use common::{FixtureDirBuilder, PayloadBuilder, project_json};
use predicates::prelude::*;
use tempfile::TempDir;

fn digest() -> Command {
    let mut cmd = Command::cargo_bin("productive-digest").unwrap();
    for var in [
        "PRODUCTIVE_ORGANIZATION",
        "PRODUCTIVE_WEBAPP_URL",
        "PRODUCTIVE_FIXTURES",
        "PRODUCTIVE_ITEMS_PER_PAGE",
        "PRODUCTIVE_MAX_HOURS",
        "OUTPUT_FORMAT",
    ] {
        cmd.env_remove(var);
    }
    cmd.env("PRODUCTIVE_ORGANIZATION", "27956-lineout");
    cmd
}

fn fixtures() -> TempDir {
    FixtureDirBuilder::new()
        .collection(
            "projects",
            PayloadBuilder::new().resource(project_json("12", "Website")).resource(project_json("13", "App")).to_json(),
        )
        .failure("people", 401, "Invalid API token")
        .build()
}

#[test]
fn test_help() {
    digest()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Compact, LLM-ready digests"))
        .stdout(predicate::str::contains("recent-activity"));
}

#[test]
fn test_no_command_points_to_help() {
    digest().assert().success().stdout(predicate::str::contains("Use --help for usage information"));
}

#[test]
fn test_projects_as_toon() {
    let dir = fixtures();
    digest()
        .arg("--fixtures")
        .arg(dir.path())
        .arg("projects")
        .assert()
        .success()
        .stdout(predicate::str::contains("data[2]"))
        .stdout(predicate::str::contains("name: Website"))
        .stdout(predicate::str::contains("sample_data").not());
}

#[test]
fn test_projects_as_json() {
    let dir = fixtures();
    let output = digest()
        .args(["--format", "json", "--fixtures"])
        .arg(dir.path())
        .arg("projects")
        .output()
        .unwrap();

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["data"][1]["id"], "13");
    assert_eq!(value["meta"]["total_count"], 2);
}

#[test]
fn test_upstream_failure_exits_nonzero_with_error_result() {
    let dir = fixtures();
    digest()
        .arg("--fixtures")
        .arg(dir.path())
        .arg("people")
        .assert()
        .failure()
        .stdout(predicate::str::contains("kind: unauthorized"))
        .stdout(predicate::str::contains("status_code: 401"));
}

#[test]
fn test_missing_organization_fails() {
    let dir = fixtures();
    digest()
        .env_remove("PRODUCTIVE_ORGANIZATION")
        .arg("--fixtures")
        .arg(dir.path())
        .arg("projects")
        .assert()
        .failure()
        .stderr(predicate::str::contains("PRODUCTIVE_ORGANIZATION"));
}

#[test]
fn test_missing_fixture_dir_fails() {
    digest()
        .args(["--fixtures", "/nonexistent/payloads", "projects"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Fixture directory does not exist"));
}

#[test]
fn test_encode_file_without_organization() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("value.json");
    fs::write(&path, r#"{"items":[{"id":1,"ok":true},{"id":2,"ok":false}]}"#).unwrap();

    digest()
        .env_remove("PRODUCTIVE_ORGANIZATION")
        .arg("encode")
        .arg(&path)
        .assert()
        .success()
        .stdout("items[2]{id,ok}:\n  1,true\n  2,false\n");
}

#[test]
fn test_invalid_format_is_rejected() {
    digest()
        .args(["--format", "yaml", "projects"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown output format"));
}
