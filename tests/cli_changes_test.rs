//! Integration tests for `parade changes`.

mod common;

use common::{TestEnv, issue, stdout_json};
use predicates::prelude::*;

#[test]
fn test_first_run_records_baseline() {
    let env = TestEnv::with_issues(&[issue("pa-1", "open", 2), issue("pa-2", "in_progress", 2)]);
    let json = stdout_json(&env.parade().args(["changes", "--state", "seen.json"]).output().unwrap());

    assert_eq!(json["baseline"], true);
    assert_eq!(json["tracked"], 2);
    assert_eq!(json["changes"], serde_json::json!([]));

    let state: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(env.path().join("seen.json")).unwrap()).unwrap();
    assert_eq!(state["pa-2"], "in_progress");
}

#[test]
fn test_transitions_reported_on_next_run() {
    let env = TestEnv::with_issues(&[issue("pa-1", "open", 2), issue("pa-2", "in_progress", 2)]);
    env.parade().args(["changes", "--state", "seen.json"]).assert().success();

    env.write_issues(&[
        issue("pa-1", "in_progress", 2),
        issue("pa-2", "in_progress", 2),
        issue("pa-3", "open", 2),
    ]);
    let json = stdout_json(&env.parade().args(["changes", "--state", "seen.json"]).output().unwrap());

    assert_eq!(json["baseline"], false);
    let changes = json["changes"].as_array().unwrap();
    assert_eq!(changes.len(), 2);
    assert_eq!(changes[0]["id"], "pa-1");
    assert_eq!(changes[0]["from"], "open");
    assert_eq!(changes[0]["to"], "in_progress");
    assert_eq!(changes[1]["id"], "pa-3");
    assert_eq!(changes[1]["from"], serde_json::Value::Null);
}

#[test]
fn test_unchanged_snapshot_human() {
    let env = TestEnv::with_issues(&[issue("pa-1", "open", 2)]);
    env.parade()
        .args(["-H", "changes", "--state", "state/seen.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Recorded baseline for 1 item(s)."));
    env.parade()
        .args(["-H", "changes", "--state", "state/seen.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No status changes."));
}

#[test]
fn test_corrupt_state_file() {
    let env = TestEnv::with_issues(&[issue("pa-1", "open", 2)]);
    env.write_file("seen.json", "{oops");
    env.parade()
        .args(["changes", "--state", "seen.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("seen.json"));
}
