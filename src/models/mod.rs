//! Data models for Parade snapshots.
//!
//! This module defines the raw records the derived-state engine reads:
//! - `Item` - Issues pulled from the tracker, with status, priority, dependencies
//! - `Dependency` - Typed edges from one item to another
//! - `AgentRuntime` / `CostSnapshot` / `Problem` - Orchestrator runtime state (see [`agents`])
//! - `WorkflowDag` / `WorkflowNode` - Pre-tiered workflow graphs (see [`workflow`])
//!
//! Every record is owned by the caller. The engine only ever borrows them.

pub mod agents;
pub mod workflow;

pub use agents::{AgentRuntime, AgentSnapshot, CostSnapshot, Problem, ProblemKind, Severity};
pub use workflow::{NodeStatus, WorkflowDag, WorkflowNode};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Dependency type that blocks by default.
pub const DEFAULT_BLOCKING_TYPE: &str = "blocks";

/// Lifecycle status of an item.
///
/// Statuses the tracker writes that Parade does not know about are kept
/// verbatim in `Other` so they survive a round trip and can be shown as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ItemStatus {
    #[default]
    Open,
    InProgress,
    Closed,
    /// Any status string outside the three known values
    Other(String),
}

impl ItemStatus {
    /// Wire representation of this status.
    pub fn as_str(&self) -> &str {
        match self {
            ItemStatus::Open => "open",
            ItemStatus::InProgress => "in_progress",
            ItemStatus::Closed => "closed",
            ItemStatus::Other(s) => s,
        }
    }

    /// Returns true for statuses that still represent outstanding work.
    pub fn is_active(&self) -> bool {
        matches!(self, ItemStatus::Open | ItemStatus::InProgress)
    }
}

impl From<String> for ItemStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "open" => ItemStatus::Open,
            "in_progress" => ItemStatus::InProgress,
            "closed" => ItemStatus::Closed,
            _ => ItemStatus::Other(s),
        }
    }
}

impl From<ItemStatus> for String {
    fn from(status: ItemStatus) -> Self {
        match status {
            ItemStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of work an item represents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ItemType {
    #[default]
    Task,
    Bug,
    Feature,
    Epic,
    Chore,
    Other(String),
}

impl ItemType {
    pub fn as_str(&self) -> &str {
        match self {
            ItemType::Task => "task",
            ItemType::Bug => "bug",
            ItemType::Feature => "feature",
            ItemType::Epic => "epic",
            ItemType::Chore => "chore",
            ItemType::Other(s) => s,
        }
    }
}

impl From<String> for ItemType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "task" => ItemType::Task,
            "bug" => ItemType::Bug,
            "feature" => ItemType::Feature,
            "epic" => ItemType::Epic,
            "chore" => ItemType::Chore,
            _ => ItemType::Other(s),
        }
    }
}

impl From<ItemType> for String {
    fn from(kind: ItemType) -> Self {
        match kind {
            ItemType::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A typed edge from the owning item to another item.
///
/// Two edges with the same `(dep_type, target_id)` pair are the same edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dependency {
    /// Relationship type (e.g., "blocks", "related", "parent-child")
    #[serde(rename = "type", alias = "dependency_type")]
    pub dep_type: String,

    /// ID of the item this edge points at
    #[serde(rename = "depends_on_id", alias = "target_id")]
    pub target_id: String,
}

impl Dependency {
    /// Create a new edge of the given type.
    pub fn new(dep_type: impl Into<String>, target_id: impl Into<String>) -> Self {
        Self {
            dep_type: dep_type.into(),
            target_id: target_id.into(),
        }
    }

    /// Create a `blocks` edge, the default blocking type.
    pub fn blocks(target_id: impl Into<String>) -> Self {
        Self::new(DEFAULT_BLOCKING_TYPE, target_id)
    }
}

/// An issue pulled from the tracker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    /// Unique identifier within a snapshot (e.g., "pa-a1b2")
    pub id: String,

    /// Item title
    #[serde(default)]
    pub title: String,

    /// Detailed description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Current status
    #[serde(default)]
    pub status: ItemStatus,

    /// Priority level (0-4, lower is more urgent)
    #[serde(default = "default_priority")]
    pub priority: u8,

    /// Kind of work
    #[serde(default, rename = "issue_type", alias = "type")]
    pub item_type: ItemType,

    /// Assigned user or agent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,

    /// Owning user or agent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,

    /// Closure timestamp (only meaningful when closed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,

    /// Free-form labels
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,

    /// Declared dependency edges, in declaration order
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

fn default_priority() -> u8 {
    2
}

impl Item {
    /// Create a new open item with the given ID and title.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            status: ItemStatus::default(),
            priority: default_priority(),
            item_type: ItemType::default(),
            assignee: None,
            owner: None,
            created_at: now,
            updated_at: now,
            closed_at: None,
            labels: Vec::new(),
            dependencies: Vec::new(),
        }
    }

    /// Returns true if the item is closed.
    pub fn is_closed(&self) -> bool {
        self.status == ItemStatus::Closed
    }

    /// Returns true if either the assignee or the owner equals `user`,
    /// compared case-insensitively.
    pub fn is_held_by(&self, user: &str) -> bool {
        let user = user.to_lowercase();
        [&self.assignee, &self.owner]
            .into_iter()
            .flatten()
            .any(|who| who.to_lowercase() == user)
    }
}
