//! Integration tests for the default `parade` command.
//!
//! These tests verify lifecycle grouping through the CLI:
//! - Every group is present, in display order
//! - Blocked work is stalled, closed work is past the stand
//! - `--blocking-type` replaces the blocking set
//! - Snapshot errors are reported as JSON on stderr

mod common;

use common::{TestEnv, depends_on, issue, stdout_json};
use predicates::prelude::*;

fn fixture() -> TestEnv {
    TestEnv::with_issues(&[
        issue("pa-1", "in_progress", 1),
        issue("pa-2", "open", 2),
        depends_on(issue("pa-3", "open", 0), "blocks", "pa-1"),
        issue("pa-4", "closed", 1),
        depends_on(issue("pa-5", "in_progress", 2), "parent-child", "pa-2"),
    ])
}

fn group_ids(json: &serde_json::Value, index: usize) -> Vec<String> {
    json["groups"][index]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["id"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn test_parade_default_command() {
    let env = fixture();
    let output = env.parade().output().unwrap();
    assert!(output.status.success());

    let json = stdout_json(&output);
    assert_eq!(json["total"], 5);
    let groups: Vec<&str> = json["groups"]
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["group"].as_str().unwrap())
        .collect();
    assert_eq!(groups, vec!["rolling", "lined_up", "stalled", "past_the_stand"]);

    assert_eq!(group_ids(&json, 0), vec!["pa-1", "pa-5"]);
    assert_eq!(group_ids(&json, 1), vec!["pa-2"]);
    assert_eq!(group_ids(&json, 2), vec!["pa-3"]);
    assert_eq!(group_ids(&json, 3), vec!["pa-4"]);
}

#[test]
fn test_groups_alias_matches() {
    let env = fixture();
    let a = env.parade().arg("parade").output().unwrap();
    let b = env.parade().arg("groups").output().unwrap();
    assert_eq!(stdout_json(&a), stdout_json(&b));
}

#[test]
fn test_blocking_type_flag() {
    let env = fixture();
    let output = env
        .parade()
        .args(["--blocking-type", "parent-child"])
        .output()
        .unwrap();
    let json = stdout_json(&output);

    // pa-3's "blocks" edge no longer gates; pa-5's parent-child edge does.
    assert_eq!(group_ids(&json, 0), vec!["pa-1"]);
    assert_eq!(group_ids(&json, 1), vec!["pa-2", "pa-3"]);
    assert_eq!(group_ids(&json, 2), vec!["pa-5"]);
}

#[test]
fn test_missing_dependency_stalls() {
    let env = TestEnv::with_issues(&[depends_on(issue("pa-1", "open", 1), "blocks", "pa-gone")]);
    let json = stdout_json(&env.parade().output().unwrap());
    assert_eq!(group_ids(&json, 2), vec!["pa-1"]);
}

#[test]
fn test_parade_human() {
    let env = fixture();
    env.parade()
        .arg("-H")
        .assert()
        .success()
        .stdout(predicate::str::contains("Rolling (2)"))
        .stdout(predicate::str::contains("Past the Stand (1)"))
        .stdout(predicate::str::contains("pa-3 [P0] Issue pa-3"));
}

#[test]
fn test_json_array_snapshot() {
    let env = TestEnv::new();
    let path = env.write_json(
        "issues.json",
        &serde_json::json!([issue("pa-1", "open", 2), issue("pa-2", "closed", 2)]),
    );
    let output = env
        .parade()
        .args(["--issues", path.to_str().unwrap()])
        .output()
        .unwrap();
    let json = stdout_json(&output);
    assert_eq!(json["total"], 2);
    assert_eq!(json["groups"][3]["count"], 1);
}

#[test]
fn test_issues_env_var() {
    let env = TestEnv::new();
    let path = env.write_file("elsewhere.jsonl", &issue("pa-9", "open", 2).to_string());
    env.parade()
        .env("PARADE_ISSUES", &path)
        .assert()
        .success()
        .stdout(predicate::str::contains("pa-9"));
}

#[test]
fn test_missing_snapshot_is_json_error() {
    let env = TestEnv::new();
    env.parade()
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("\"error\""))
        .stderr(predicate::str::contains("issues.jsonl"));
}

#[test]
fn test_missing_snapshot_human_error() {
    let env = TestEnv::new();
    env.parade()
        .arg("-H")
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("Error: "));
}

#[test]
fn test_malformed_line_reports_line() {
    let env = TestEnv::new();
    env.write_file(
        common::ISSUES_PATH,
        &format!("{}\nnot json\n", issue("pa-1", "open", 2)),
    );
    env.parade()
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 2"));
}
