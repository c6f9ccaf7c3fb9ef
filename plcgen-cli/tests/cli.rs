use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

fn write_file(dir: &Path, name: &str, content: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

const AXES_DOCUMENT: &str = r#"{
  "library": {
    "name": "axes",
    "items": [
      { "ENUMERATION": { "name": "Mode", "items": ["IDLE", "RUN"] } },
      { "STRUCT": { "name": "AxisConfig",
                    "items": [ { "name": "maxSpeed", "type": "t_double" } ] } },
      { "FB": { "name": "Drive",
                "in": [ { "name": "enable", "type": "t_bool" } ] } },
      { "STATEMACHINE": { "name": "Axis",
                          "parts": [ { "name": "drive", "type": "Drive" } ] } }
    ]
  }
}"#;

#[test]
fn check_when_valid_documents_then_ok() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "axes.json", AXES_DOCUMENT);

    let mut cmd = Command::cargo_bin("plcgen").unwrap();
    cmd.arg("check")
        .arg("--input")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("OK"));
}

#[test]
fn check_when_unresolved_reference_then_error_with_code() {
    let dir = tempfile::tempdir().unwrap();
    write_file(
        dir.path(),
        "broken.json",
        r#"{ "library": { "name": "broken", "items": [
            { "STRUCT": { "name": "S",
                          "items": [ { "name": "x", "type": "t_missing" } ] } }
        ] } }"#,
    );

    let mut cmd = Command::cargo_bin("plcgen").unwrap();
    cmd.arg("check")
        .arg("--input")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("P0004"));
}

#[test]
fn check_when_unrecognized_field_then_schema_error() {
    let dir = tempfile::tempdir().unwrap();
    write_file(
        dir.path(),
        "broken.json",
        r#"{ "library": { "name": "broken", "items": [
            { "STRUCT": { "name": "S", "bogus": 1 } }
        ] } }"#,
    );

    let mut cmd = Command::cargo_bin("plcgen").unwrap();
    cmd.arg("check")
        .arg("--input")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("P0008"));
}

#[test]
fn check_when_input_directory_missing_then_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");

    let mut cmd = Command::cargo_bin("plcgen").unwrap();
    cmd.arg("check")
        .arg("--input")
        .arg(&missing)
        .assert()
        .failure();
}

#[test]
fn export_when_valid_documents_then_model_files_written() {
    let dir = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_file(dir.path(), "axes.json", AXES_DOCUMENT);

    let mut cmd = Command::cargo_bin("plcgen").unwrap();
    cmd.arg("export")
        .arg("--input")
        .arg(dir.path())
        .arg("--output")
        .arg(out.path())
        .assert()
        .success();

    let exported = fs::read_to_string(out.path().join("axes.model.json")).unwrap();
    assert!(exported.contains("SM_Axis"));
}
