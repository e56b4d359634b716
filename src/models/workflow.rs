//! Workflow graphs produced by the external planner.
//!
//! A `WorkflowDag` arrives already tiered, with its critical path computed.
//! Parade only re-renders it; nothing here derives tiers or paths.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Status of one workflow step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    Done,
    InProgress,
    Ready,
    Blocked,
    #[default]
    Open,
    Closed,
    /// Anything the planner emits that Parade does not recognize
    #[serde(other)]
    Unknown,
}

impl NodeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeStatus::Done => "done",
            NodeStatus::InProgress => "in_progress",
            NodeStatus::Ready => "ready",
            NodeStatus::Blocked => "blocked",
            NodeStatus::Open => "open",
            NodeStatus::Closed => "closed",
            NodeStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One step in a workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowNode {
    pub id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub status: NodeStatus,

    /// Rank in the workflow, ascending = earlier
    #[serde(default)]
    pub tier: i32,

    /// True when the node shares its tier with siblings
    #[serde(default)]
    pub parallel: bool,
}

impl WorkflowNode {
    pub fn new(id: impl Into<String>, title: impl Into<String>, status: NodeStatus, tier: i32) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            status,
            tier,
            parallel: false,
        }
    }
}

/// A tiered workflow graph.
///
/// `tier_groups` order is authoritative: it is never re-derived from the
/// nodes' `tier` fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowDag {
    /// Node IDs per tier, earliest tier first
    #[serde(default, rename = "tiers", alias = "tier_groups")]
    pub tier_groups: Vec<Vec<String>>,

    #[serde(default)]
    pub nodes: HashMap<String, WorkflowNode>,

    /// Node IDs along the critical path, supplied by the planner
    #[serde(default)]
    pub critical_path: Vec<String>,
}

impl WorkflowDag {
    /// Insert a node, replacing any existing node with the same ID.
    pub fn insert(&mut self, node: WorkflowNode) {
        self.nodes.insert(node.id.clone(), node);
    }

    pub fn is_empty(&self) -> bool {
        self.tier_groups.is_empty() && self.nodes.is_empty()
    }
}
