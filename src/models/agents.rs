//! Orchestrator runtime records.
//!
//! These mirror what the multi-agent orchestration system reports about its
//! agents and spend. They are read-only inputs to the problem detector and the
//! velocity aggregator.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Runtime state of a single agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRuntime {
    /// Agent name (e.g., "polecat-3")
    pub name: String,

    /// Agent role (e.g., "worker", "witness")
    #[serde(default)]
    pub role: String,

    /// Free-form state string (idle, working, backoff, stuck, spawning, ...)
    #[serde(default)]
    pub state: String,

    /// Whether the orchestrator has work queued for this agent
    #[serde(default)]
    pub has_work: bool,

    /// ID of the item the agent currently holds, empty when none
    #[serde(default, alias = "hooked_bead")]
    pub hook_bead: String,

    /// Whether the agent process is alive
    #[serde(default = "default_running")]
    pub running: bool,
}

fn default_running() -> bool {
    true
}

impl AgentRuntime {
    /// Create a running, idle agent with no work.
    pub fn new(name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            state: "idle".to_string(),
            has_work: false,
            hook_bead: String::new(),
            running: true,
        }
    }

    /// Returns true if the agent is actively doing work.
    pub fn is_working(&self) -> bool {
        matches!(self.state.as_str(), "working" | "spawning")
    }
}

/// Agent list as written by the orchestrator status command.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentSnapshot {
    #[serde(default)]
    pub agents: Vec<AgentRuntime>,
}

/// Spend reported by the orchestrator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostSnapshot {
    /// Lifetime spend in USD
    #[serde(default)]
    pub total_usd: f64,

    /// Spend since local midnight in USD
    #[serde(default)]
    pub today_usd: f64,

    /// Number of agent sessions the spend covers
    #[serde(default)]
    pub session_count: u64,
}

/// Kind of anomaly detected in an agent's runtime state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemKind {
    /// Has work queued but sits idle
    Stalled,
    /// Agent reports itself stuck
    Stuck,
    /// Agent is backing off after failures
    Backoff,
    /// Process is gone but still holds an item
    Zombie,
}

impl ProblemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProblemKind::Stalled => "stalled",
            ProblemKind::Stuck => "stuck",
            ProblemKind::Backoff => "backoff",
            ProblemKind::Zombie => "zombie",
        }
    }
}

impl fmt::Display for ProblemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How loudly a problem should be surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warn,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Warn => "warn",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An anomaly found in one agent's runtime state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    #[serde(rename = "type")]
    pub kind: ProblemKind,
    pub agent: String,
    pub detail: String,
    pub severity: Severity,
}
