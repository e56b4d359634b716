//! Anomaly detection over an agent runtime snapshot.
//!
//! # Rules
//!
//! Each rule is a predicate over a single agent record. Rules are evaluated
//! independently, so one agent can trip several of them and is reported once
//! per rule:
//! - **stalled** (warn): has work but is idle
//! - **stuck** (error): reports state `stuck`
//! - **backoff** (warn): reports state `backoff`
//! - **zombie** (error): not running but still holds an item

use crate::models::{AgentRuntime, Problem, ProblemKind, Severity};

/// A single detection rule.
pub struct ProblemRule {
    pub kind: ProblemKind,
    pub severity: Severity,
    /// Returns true when the agent exhibits the problem
    pub matches: fn(&AgentRuntime) -> bool,
    /// Human-readable explanation for a matching agent
    pub detail: fn(&AgentRuntime) -> String,
}

/// Rules in evaluation order.
pub const RULES: &[ProblemRule] = &[
    ProblemRule {
        kind: ProblemKind::Stalled,
        severity: Severity::Warn,
        matches: |a| a.has_work && a.state == "idle",
        detail: |_| "has work queued but is idle".to_string(),
    },
    ProblemRule {
        kind: ProblemKind::Stuck,
        severity: Severity::Error,
        matches: |a| a.state == "stuck",
        detail: |_| "agent reports it is stuck".to_string(),
    },
    ProblemRule {
        kind: ProblemKind::Backoff,
        severity: Severity::Warn,
        matches: |a| a.state == "backoff",
        detail: |_| "agent is backing off after failures".to_string(),
    },
    ProblemRule {
        kind: ProblemKind::Zombie,
        severity: Severity::Error,
        matches: |a| !a.running && !a.hook_bead.is_empty(),
        detail: |a| format!("not running but still holds {}", a.hook_bead),
    },
];

/// Problems for one agent, one per matching rule.
pub fn detect_agent_problems(agent: &AgentRuntime) -> impl Iterator<Item = Problem> + '_ {
    RULES.iter().filter(|rule| (rule.matches)(agent)).map(|rule| Problem {
        kind: rule.kind,
        agent: agent.name.clone(),
        detail: (rule.detail)(agent),
        severity: rule.severity,
    })
}

/// Scan a snapshot for problems, agents in input order.
///
/// A missing snapshot yields no problems.
pub fn detect_problems(agents: Option<&[AgentRuntime]>) -> Vec<Problem> {
    let Some(agents) = agents else {
        return Vec::new();
    };

    let problems: Vec<Problem> = agents.iter().flat_map(detect_agent_problems).collect();

    tracing::debug!(agents = agents.len(), problems = problems.len(), "detected agent problems");
    problems
}
