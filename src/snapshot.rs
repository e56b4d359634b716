//! Snapshot loading.
//!
//! Snapshots are produced by external tools (the issue tracker, the agent
//! orchestrator and the workflow planner) and handed to the engine as plain
//! values. This module only reads and deserializes them.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::path::Path;

use crate::models::{AgentRuntime, AgentSnapshot, CostSnapshot, Item, WorkflowDag};
use crate::{Error, Result};

/// Placeholder path used when parsing text that did not come from a file.
const INLINE_SOURCE: &str = "<inline>";

/// Agent files come either as a bare list or wrapped in an object.
#[derive(Deserialize)]
#[serde(untagged)]
enum AgentFile {
    List(Vec<AgentRuntime>),
    Wrapped(AgentSnapshot),
}

impl From<AgentFile> for Vec<AgentRuntime> {
    fn from(file: AgentFile) -> Self {
        match file {
            AgentFile::List(agents) => agents,
            AgentFile::Wrapped(snapshot) => snapshot.agents,
        }
    }
}

fn snapshot_error(path: &Path, line: usize, err: impl std::fmt::Display) -> Error {
    Error::Snapshot {
        path: path.to_path_buf(),
        line,
        message: err.to_string(),
    }
}

fn parse_json<T: DeserializeOwned>(text: &str, path: &Path) -> Result<T> {
    serde_json::from_str(text).map_err(|e| snapshot_error(path, e.line(), e))
}

/// Parse an issue snapshot, either a JSON array or one object per line.
pub fn parse_items(text: &str) -> Result<Vec<Item>> {
    parse_items_from(text, Path::new(INLINE_SOURCE))
}

fn parse_items_from(text: &str, path: &Path) -> Result<Vec<Item>> {
    let raw: Vec<Item> = if text.trim_start().starts_with('[') {
        parse_json(text, path)?
    } else {
        let mut items = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let item = serde_json::from_str::<Item>(line).map_err(|e| snapshot_error(path, idx + 1, e))?;
            items.push(item);
        }
        items
    };

    Ok(sanitize_items(raw, path))
}

/// Drop items without an ID and warn about duplicates.
fn sanitize_items(raw: Vec<Item>, path: &Path) -> Vec<Item> {
    let mut seen: HashSet<String> = HashSet::with_capacity(raw.len());
    let mut items = Vec::with_capacity(raw.len());

    for item in raw {
        if item.id.trim().is_empty() {
            tracing::warn!(path = %path.display(), title = %item.title, "skipping item without an id");
            continue;
        }
        if !seen.insert(item.id.clone()) {
            tracing::warn!(path = %path.display(), id = %item.id, "duplicate item id, later record wins");
        }
        items.push(item);
    }

    tracing::debug!(path = %path.display(), items = items.len(), "parsed issue snapshot");
    items
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| std::io::Error::new(e.kind(), format!("Failed to read {}: {}", path.display(), e)).into())
}

/// Load an issue snapshot from a file.
pub fn load_items(path: &Path) -> Result<Vec<Item>> {
    parse_items_from(&read(path)?, path)
}

/// Load an agent snapshot.
pub fn load_agents(path: &Path) -> Result<Vec<AgentRuntime>> {
    let file: AgentFile = parse_json(&read(path)?, path)?;
    let agents: Vec<AgentRuntime> = file.into();
    tracing::debug!(path = %path.display(), agents = agents.len(), "loaded agent snapshot");
    Ok(agents)
}

/// Load a cost snapshot.
pub fn load_costs(path: &Path) -> Result<CostSnapshot> {
    parse_json(&read(path)?, path)
}

/// Load a workflow graph and check it against the node map.
pub fn load_dag(path: &Path) -> Result<WorkflowDag> {
    let dag: WorkflowDag = parse_json(&read(path)?, path)?;

    let dangling = dag
        .tier_groups
        .iter()
        .flatten()
        .chain(dag.critical_path.iter())
        .filter(|id| !dag.nodes.contains_key(id.as_str()))
        .count();
    if dangling > 0 {
        tracing::warn!(path = %path.display(), dangling, "workflow references nodes missing from the node map");
    }

    Ok(dag)
}

/// Load an optional snapshot, passing through `None`.
pub fn load_optional<T>(path: Option<&Path>, load: fn(&Path) -> Result<T>) -> Result<Option<T>> {
    path.map(load).transpose()
}
