use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use serde_json::{json, Value};
use tempfile::TempDir;

fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("vianeo-validate").unwrap();
    cmd.env_remove("VIANEO_CONFIG")
        .env_remove("VIANEO_THRESHOLD")
        .env_remove("RUST_LOG");
    cmd
}

fn write(dir: &TempDir, name: &str, value: &Value) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    path
}

// -- flow ----------------------------------------------------------------------

#[test]
fn flow_consistent_pair_passes() {
    let dir = TempDir::new().unwrap();
    let source = write(
        &dir,
        "step_5.json",
        &json!({"requesters": ["Alice", "Bob"], "needs": ["Save time"]}),
    );
    let target = write(
        &dir,
        "step_7.json",
        &json!({"column_headers": ["Bob", "Alice"], "row_labels": ["Save time"]}),
    );

    cmd()
        .args(["flow", "--source-step", "step_5", "--target-step", "step_7"])
        .arg(&source)
        .arg(&target)
        .assert()
        .success()
        .stdout(contains("0 errors").and(contains("PASSED")));
}

#[test]
fn flow_dropped_item_fails() {
    let dir = TempDir::new().unwrap();
    let source = write(&dir, "s.json", &json!({"requesters": ["Alice", "Bob", "Charlie"]}));
    let target = write(&dir, "t.json", &json!({"column_headers": ["Alice", "Bob"]}));

    cmd()
        .args(["flow", "--source-step", "step_5", "--target-step", "step_7"])
        .arg(&source)
        .arg(&target)
        .assert()
        .code(1)
        .stdout(contains("[ERROR] step_5->step_7: 'Charlie'").and(contains("FAILED")));
}

#[test]
fn verbose_includes_passing_results() {
    let dir = TempDir::new().unwrap();
    let source = write(&dir, "s.json", &json!({"requesters": ["Alice"]}));
    let target = write(&dir, "t.json", &json!({"column_headers": ["Alice"]}));

    cmd()
        .args(["flow", "--source-step", "step_5", "--target-step", "step_7"])
        .arg(&source)
        .arg(&target)
        .assert()
        .success()
        .stdout(contains("match exactly").not());

    cmd()
        .args(["--verbose", "flow", "--source-step", "step_5", "--target-step", "step_7"])
        .arg(&source)
        .arg(&target)
        .assert()
        .success()
        .stdout(contains("[INFO] step_5->step_7: All 1 requesters items match exactly"));
}

// -- project -------------------------------------------------------------------

#[test]
fn project_json_reports_skipped_pairs() {
    let dir = TempDir::new().unwrap();
    let steps = write(
        &dir,
        "project.json",
        &json!({
            "step_5": {"requesters": ["Alice"]},
            "step_7": {"column_headers": ["Alice"]}
        }),
    );

    let output = cmd()
        .args(["--json", "project"])
        .arg(&steps)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let out: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(out["valid"], json!(true));
    assert!(out["warnings"].as_u64().unwrap() >= 5);
    assert!(out["results"]
        .as_array()
        .unwrap()
        .iter()
        .any(|r| r["message"] == json!("Cannot validate: missing step_8, step_9")));
}

// -- scores --------------------------------------------------------------------

#[test]
fn scores_below_threshold_fail_with_recommendation() {
    let dir = TempDir::new().unwrap();
    let record = write(
        &dir,
        "scores.json",
        &json!({
            "legitimacy": 2.5, "desirability": 4.0, "acceptability": 3.5,
            "feasibility": 3.2, "viability": 3.0
        }),
    );

    cmd()
        .arg("scores")
        .arg(&record)
        .assert()
        .code(1)
        .stdout(contains("[ERROR] legitimacy").and(contains("Moderate gap")));
}

#[test]
fn threshold_from_env() {
    let dir = TempDir::new().unwrap();
    let record = write(&dir, "scores.json", &json!({"viability": 3.2}));

    cmd()
        .env("VIANEO_THRESHOLD", "investment")
        .arg("scores")
        .arg(&record)
        .assert()
        .success()
        .stdout(contains("[WARN] viability").and(contains("investment threshold")));
}

#[test]
fn non_numeric_score_exits_two() {
    let dir = TempDir::new().unwrap();
    let record = write(&dir, "scores.json", &json!({"viability": "high"}));

    cmd()
        .arg("scores")
        .arg(&record)
        .assert()
        .code(2)
        .stderr(contains("must be a number"));
}

// -- evidence ------------------------------------------------------------------

#[test]
fn empty_evidence_log_is_a_warning() {
    let dir = TempDir::new().unwrap();
    let record = write(&dir, "evidence.json", &json!({"evidence_log": []}));

    cmd()
        .arg("evidence")
        .arg(&record)
        .assert()
        .code(1)
        .stdout(contains("[WARN] evidence_log: No supporting evidence"))
        .stdout(contains("0 evidence entries"));
}

// -- limits --------------------------------------------------------------------

#[test]
fn limits_flags_long_need() {
    let dir = TempDir::new().unwrap();
    let record = write(
        &dir,
        "needs.json",
        &json!({"needs": ["Short need", "x".repeat(61)]}),
    );

    cmd()
        .arg("limits")
        .arg(&record)
        .assert()
        .code(1)
        .stdout(contains("61/60 characters (OVER by 1)"));
}

// -- deps ----------------------------------------------------------------------

#[test]
fn deps_missing_upstream() {
    cmd()
        .args(["deps", "step_9", "--available", "step_5"])
        .assert()
        .code(1)
        .stdout(contains("Required upstream step step_8 not available"));

    cmd()
        .args(["deps", "step_9", "--available", "step_5,step_8"])
        .assert()
        .success();
}

// -- load failures -------------------------------------------------------------

#[test]
fn non_mapping_record_exits_two() {
    let dir = TempDir::new().unwrap();
    let record = write(&dir, "list.json", &json!(["not", "a", "mapping"]));

    cmd()
        .arg("limits")
        .arg(&record)
        .assert()
        .code(2)
        .stderr(contains("must be a mapping"));
}

#[test]
fn invalid_config_override_exits_two() {
    let dir = TempDir::new().unwrap();
    let config = write(
        &dir,
        "config.json",
        &json!({"scores": {"dimensions": [{"dimension": "viability", "weight": 0.4}]}}),
    );

    cmd()
        .env("VIANEO_CONFIG", &config)
        .args(["deps", "step_1"])
        .assert()
        .code(2)
        .stderr(contains("sum to 1.0"));
}

#[test]
fn config_override_changes_limits() {
    let dir = TempDir::new().unwrap();
    let config = write(&dir, "config.json", &json!({"char_limits": {"need_statement": 100}}));
    let record = write(&dir, "needs.json", &json!({"needs": ["x".repeat(61)]}));

    cmd()
        .arg("--config")
        .arg(&config)
        .arg("limits")
        .arg(&record)
        .assert()
        .success();
}
