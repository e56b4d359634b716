//! Row layout for pre-tiered workflow graphs.
//!
//! Tiers come from the external planner already ordered. Layout turns each
//! non-empty tier into one row (a single node or a parallel branch) and puts a
//! connector between consecutive rows. Node IDs a tier names but the node map
//! lacks are dropped without complaint.

use serde::Serialize;
use std::collections::HashSet;

use crate::models::{NodeStatus, WorkflowDag, WorkflowNode};

/// Separator used when rendering the critical path as one line.
pub const CRITICAL_PATH_SEPARATOR: &str = " → ";

/// One rendered row of a workflow graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DagRow<'a> {
    /// A tier with exactly one node
    Single { node: &'a WorkflowNode },
    /// A tier with two or more nodes, in tier order
    Parallel { nodes: Vec<&'a WorkflowNode> },
    /// Link between two consecutive tiers
    Connector,
}

impl DagRow<'_> {
    pub fn is_connector(&self) -> bool {
        matches!(self, DagRow::Connector)
    }
}

fn resolve_tier<'a>(dag: &'a WorkflowDag, tier: &[String]) -> Vec<&'a WorkflowNode> {
    tier.iter().filter_map(|id| dag.nodes.get(id)).collect()
}

/// Lay out a workflow graph as rows.
///
/// `n` non-empty tiers produce `n` node rows separated by `n - 1` connectors.
pub fn layout_dag(dag: Option<&WorkflowDag>) -> Vec<DagRow<'_>> {
    let Some(dag) = dag else {
        return Vec::new();
    };

    let mut rows = Vec::new();
    for tier in &dag.tier_groups {
        let mut nodes = resolve_tier(dag, tier);
        if nodes.is_empty() {
            continue;
        }
        if !rows.is_empty() {
            rows.push(DagRow::Connector);
        }
        let row = if nodes.len() == 1 {
            DagRow::Single { node: nodes.remove(0) }
        } else {
            DagRow::Parallel { nodes }
        };
        rows.push(row);
    }

    tracing::debug!(tiers = dag.tier_groups.len(), rows = rows.len(), "laid out workflow");
    rows
}

/// Titles along the critical path, falling back to the raw ID for nodes the
/// map does not contain.
pub fn critical_path_titles(dag: Option<&WorkflowDag>) -> Vec<String> {
    let Some(dag) = dag else {
        return Vec::new();
    };
    dag.critical_path
        .iter()
        .map(|id| match dag.nodes.get(id) {
            Some(node) => node.title.clone(),
            None => id.clone(),
        })
        .collect()
}

/// Critical path rendered as a single line.
pub fn critical_path_string(dag: Option<&WorkflowDag>) -> String {
    critical_path_titles(dag).join(CRITICAL_PATH_SEPARATOR)
}

/// Membership set for highlighting critical-path nodes.
pub fn critical_path_set(dag: Option<&WorkflowDag>) -> HashSet<&str> {
    match dag {
        Some(dag) => dag.critical_path.iter().map(String::as_str).collect(),
        None => HashSet::new(),
    }
}

/// Nodes in a stable order: tier groups first (tier order, then position in
/// the tier), then any nodes no tier mentions, sorted by `(tier, id)`.
fn nodes_in_stable_order(dag: &WorkflowDag) -> Vec<&WorkflowNode> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut ordered: Vec<&WorkflowNode> = Vec::with_capacity(dag.nodes.len());

    for node in dag.tier_groups.iter().flat_map(|tier| resolve_tier(dag, tier)) {
        if seen.insert(node.id.as_str()) {
            ordered.push(node);
        }
    }

    let mut rest: Vec<&WorkflowNode> = dag
        .nodes
        .values()
        .filter(|node| !seen.contains(node.id.as_str()))
        .collect();
    rest.sort_by(|a, b| a.tier.cmp(&b.tier).then_with(|| a.id.cmp(&b.id)));
    ordered.extend(rest);
    ordered
}

/// The step the workflow is currently on.
///
/// The first in-progress node wins; otherwise the first ready node in tier
/// order. Both searches walk [`nodes_in_stable_order`], so the answer does
/// not depend on hash map iteration.
pub fn active_step_id(dag: Option<&WorkflowDag>) -> Option<String> {
    let dag = dag?;
    let ordered = nodes_in_stable_order(dag);

    if let Some(node) = ordered.iter().find(|n| n.status == NodeStatus::InProgress) {
        return Some(node.id.clone());
    }

    dag.tier_groups
        .iter()
        .flat_map(|tier| resolve_tier(dag, tier))
        .find(|node| node.status == NodeStatus::Ready)
        .map(|node| node.id.clone())
}
