//! Common test utilities for parade integration tests.
//!
//! Provides `TestEnv` for isolated test environments that never read the
//! user's real `~/.config/parade/config.kdl`.

#![allow(dead_code)]

use assert_cmd::Command;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
pub use tempfile::TempDir;

/// Default issue snapshot location, relative to the working directory.
pub const ISSUES_PATH: &str = ".beads/issues.jsonl";

/// A test environment with an isolated working and config directory.
///
/// The `parade()` method returns a `Command` that runs in `work_dir` with
/// `PARADE_CONFIG_DIR` pointing at `config_dir`, and with every other
/// `PARADE_*` variable cleared so the host environment cannot leak in.
pub struct TestEnv {
    pub work_dir: TempDir,
    pub config_dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            work_dir: TempDir::new().unwrap(),
            config_dir: TempDir::new().unwrap(),
        }
    }

    /// Create an environment with `issues` written to the default snapshot path.
    pub fn with_issues(issues: &[Value]) -> Self {
        let env = Self::new();
        env.write_issues(issues);
        env
    }

    pub fn parade(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_parade"));
        cmd.current_dir(self.work_dir.path());
        cmd.env("PARADE_CONFIG_DIR", self.config_dir.path());
        cmd.env_remove("PARADE_USER");
        cmd.env_remove("PARADE_ISSUES");
        cmd.env_remove("PARADE_LOG");
        cmd
    }

    pub fn path(&self) -> &Path {
        self.work_dir.path()
    }

    /// Write a file under the working directory and return its path.
    pub fn write_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.work_dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path
    }

    /// Write issues as JSONL to the default snapshot path.
    pub fn write_issues(&self, issues: &[Value]) -> PathBuf {
        let lines: Vec<String> = issues.iter().map(|v| v.to_string()).collect();
        self.write_file(ISSUES_PATH, &lines.join("\n"))
    }

    pub fn write_json(&self, name: &str, value: &Value) -> PathBuf {
        self.write_file(name, &value.to_string())
    }

    pub fn write_config(&self, kdl: &str) -> PathBuf {
        let path = self.config_dir.path().join("config.kdl");
        std::fs::write(&path, kdl).unwrap();
        path
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// Build an issue record in the tracker's on-disk format.
pub fn issue(id: &str, status: &str, priority: u8) -> Value {
    json!({
        "id": id,
        "title": format!("Issue {}", id),
        "status": status,
        "priority": priority,
        "issue_type": "task",
        "created_at": "2026-03-01T10:00:00Z",
        "updated_at": "2026-03-01T10:00:00Z"
    })
}

/// Add a dependency edge to an issue record.
pub fn depends_on(mut issue: Value, dep_type: &str, target: &str) -> Value {
    let id = issue["id"].clone();
    let edge = json!({ "issue_id": id, "depends_on_id": target, "type": dep_type });
    match issue.get_mut("dependencies").and_then(Value::as_array_mut) {
        Some(deps) => deps.push(edge),
        None => issue["dependencies"] = json!([edge]),
    }
    issue
}

/// Set a string field on an issue record.
pub fn with(mut issue: Value, key: &str, value: &str) -> Value {
    issue[key] = json!(value);
    issue
}

/// Parse a command's stdout as JSON.
pub fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap()
}
