//! CLI E2E tests for the voter-count binary.
//!
//! Validates:
//! - `counties` lists the reference table in text and JSON
//! - `run` updates the polygon layer and reports in JSON
//! - Unknown counties exit 2 and leave no output
//! - Empty extractions exit 11
//! - Invalid config exits 10 from both `config validate` and `run`
//! - `config schema` emits the config JSON schema

mod common;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use common::*;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::time::Duration;

// ============================================================================
// Helpers
// ============================================================================

/// Command for the voter-count binary with the environment isolated.
fn voter_count(home: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("voter-count");
    cmd.timeout(Duration::from_secs(60))
        .env_remove("VOTER_COUNT_CONFIG")
        .env_remove("VOTER_COUNT_POINT_SOURCE")
        .env_remove("VOTER_COUNT_SCRATCH_DIR")
        .env_remove("RUST_LOG")
        .env("XDG_CONFIG_HOME", home);
    cmd
}

fn write_config(dir: &Path, body: &str) -> std::path::PathBuf {
    let path = dir.join("config.json");
    fs::write(&path, body).unwrap();
    path
}

fn parse_stdout(output: &[u8]) -> Value {
    serde_json::from_slice(output).expect("parse JSON")
}

// ============================================================================
// counties
// ============================================================================

#[test]
fn counties_lists_all_twenty_nine() {
    let ws = Workspace::new();
    voter_count(ws.path())
        .arg("counties")
        .assert()
        .success()
        .stdout(predicate::str::contains(" 1  Beaver"))
        .stdout(predicate::str::contains("29  Weber"))
        .stdout(predicate::function(|out: &str| out.lines().count() == 29));
}

#[test]
fn counties_json() {
    let ws = Workspace::new();
    let output = voter_count(ws.path())
        .args(["--format", "json", "counties"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json = parse_stdout(&output);
    let counties = json["counties"].as_array().unwrap();
    assert_eq!(counties.len(), 29);
    assert_eq!(counties[1]["name"], "Box Elder");
    assert_eq!(counties[1]["id"], 2);
}

// ============================================================================
// run
// ============================================================================

#[test]
fn run_writes_counts_and_reports_json() {
    let ws = Workspace::new();
    let polygons = write_precincts(ws.path(), &["A", "B"]);
    let points = write_points(
        ws.path(),
        vec![point(1.0, 1.0, 3, 5), point(2.0, 2.0, 3, 3), point(3.0, 3.0, 3, 2)],
    );
    let config = write_config(ws.path(), "{}");

    let output = voter_count(ws.path())
        .arg("--config")
        .arg(&config)
        .args(["--format", "json", "run"])
        .arg(&polygons)
        .arg("Cache")
        .arg(&ws.output)
        .arg("--point-source")
        .arg(&points)
        .arg("--scratch-dir")
        .arg(&ws.scratch)
        .assert()
        .success()
        .code(0)
        .get_output()
        .stdout
        .clone();

    let json = parse_stdout(&output);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["report"]["predicate"], "COUNTY_ID = 3");
    assert_eq!(json["report"]["point_count"], 3);
    assert_eq!(json["report"]["matched"], 2);
    assert!(json["report"]["run_id"].as_str().unwrap().starts_with("run-"));

    assert_eq!(summary(&polygons), vec![(Some(10), Some(3)), (Some(0), Some(0))]);
    assert_eq!(fs::read_dir(&ws.output).unwrap().count(), 1);
    assert_eq!(ws.scratch_entries(), 0);
}

#[test]
fn run_text_output_names_the_output_dataset() {
    let ws = Workspace::new();
    let polygons = write_precincts(ws.path(), &["A"]);
    let points = write_points(ws.path(), vec![point(1.0, 1.0, 2, 4)]);
    let config = write_config(ws.path(), "{}");

    voter_count(ws.path())
        .arg("--config")
        .arg(&config)
        .arg("run")
        .arg(&polygons)
        .arg("'Box Elder'")
        .arg(&ws.output)
        .arg("--point-source")
        .arg(&points)
        .arg("--scratch-dir")
        .arg(&ws.scratch)
        .assert()
        .success()
        .stdout(predicate::str::contains("Box Elder (2)"))
        .stdout(predicate::str::contains("voter_counts_output_"))
        .stderr(predicate::str::contains("Final county list"));
}

#[test]
fn unknown_county_exits_2() {
    let ws = Workspace::new();
    let polygons = write_precincts(ws.path(), &["A"]);
    let before = fs::read(&polygons).unwrap();
    let points = write_points(ws.path(), vec![point(1.0, 1.0, 3, 5)]);
    let config = write_config(ws.path(), "{}");

    let output = voter_count(ws.path())
        .arg("--config")
        .arg(&config)
        .args(["--format", "json", "run"])
        .arg(&polygons)
        .arg("Cache;Atlantis")
        .arg(&ws.output)
        .arg("--point-source")
        .arg(&points)
        .assert()
        .code(2)
        .get_output()
        .stdout
        .clone();

    let json = parse_stdout(&output);
    assert_eq!(json["status"], "error");
    assert_eq!(json["exit_code"], 2);
    assert_eq!(json["error"]["code"], 10);
    assert!(json["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Atlantis"));
    assert_eq!(fs::read(&polygons).unwrap(), before);
    assert_eq!(fs::read_dir(&ws.output).unwrap().count(), 0);
}

#[test]
fn empty_extraction_exits_11() {
    let ws = Workspace::new();
    let polygons = write_precincts(ws.path(), &["A"]);
    let points = write_points(ws.path(), vec![point(1.0, 1.0, 3, 5)]);
    let config = write_config(ws.path(), "{}");

    voter_count(ws.path())
        .arg("--config")
        .arg(&config)
        .arg("run")
        .arg(&polygons)
        .arg("Kane")
        .arg(&ws.output)
        .arg("--point-source")
        .arg(&points)
        .arg("--scratch-dir")
        .arg(&ws.scratch)
        .assert()
        .code(11)
        .stderr(predicate::str::contains("COUNTY_ID = 13"));
    assert_eq!(ws.scratch_entries(), 0);
}

#[test]
fn run_rejects_invalid_override() {
    let ws = Workspace::new();
    let polygons = write_precincts(ws.path(), &["A"]);
    let config = write_config(ws.path(), "{}");

    voter_count(ws.path())
        .arg("--config")
        .arg(&config)
        .arg("run")
        .arg(&polygons)
        .arg("Cache")
        .arg(&ws.output)
        .args(["--point-source", ""])
        .assert()
        .code(10);
}

// ============================================================================
// config
// ============================================================================

#[test]
fn config_validate_defaults() {
    let ws = Workspace::new();
    voter_count(ws.path())
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("built-in defaults"));
}

#[test]
fn config_validate_rejects_zero_page_size() {
    let ws = Workspace::new();
    let config = write_config(ws.path(), r#"{"remote": {"page_size": 0}}"#);
    voter_count(ws.path())
        .arg("--config")
        .arg(&config)
        .args(["config", "validate"])
        .assert()
        .code(10)
        .stderr(predicate::str::contains("page_size"));
}

#[test]
fn config_validate_rejects_bad_json() {
    let ws = Workspace::new();
    let config = write_config(ws.path(), "{ not json");
    let output = voter_count(ws.path())
        .arg("--config")
        .arg(&config)
        .args(["--format", "json", "config", "validate"])
        .assert()
        .code(10)
        .get_output()
        .stdout
        .clone();
    assert_eq!(parse_stdout(&output)["exit_code"], 10);
}

#[test]
fn config_show_prints_resolved_values() {
    let ws = Workspace::new();
    let config = write_config(ws.path(), r#"{"join_key": {"field": "KeyID"}}"#);
    voter_count(ws.path())
        .arg("--config")
        .arg(&config)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# source: --config"))
        .stdout(predicate::str::contains("\"KeyID\""));
}

#[test]
fn config_schema_describes_point_source() {
    let ws = Workspace::new();
    voter_count(ws.path())
        .args(["config", "schema"])
        .assert()
        .success()
        .stdout(predicate::str::contains("point_source"));
}
