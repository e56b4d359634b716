//! Command implementations for the Parade CLI.
//!
//! Each command loads the snapshots it needs, runs the engine and returns a
//! result that renders as JSON or plain text:
//! - `parade` - lifecycle groups
//! - `focus` - capped "what next" list
//! - `deps` - dependency evaluation for one item
//! - `dag` - workflow rows and critical path
//! - `problems` - agent anomalies
//! - `velocity` - throughput metrics
//! - `changes` - status transitions since the last run
//! - `summary` - all of the above in one document
//! - `config` - resolved configuration

use chrono::{DateTime, FixedOffset, Local, TimeZone};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::config::{ResolvedConfig, config_path};
use crate::engine::{
    ClassifiedEdge, Dashboard, DashboardInput, DagRow, DepEval, FocusBucket, FocusCaps, ParadeGroup, SeenStatuses,
    StatusChange, VelocityMetrics, blocked_by_ids, blocks_ids, build_index, critical_path_set,
    critical_path_titles, detect_status_changes, evaluate, focus_buckets, group_by_parade,
};
use crate::models::{AgentRuntime, CostSnapshot, Item, ItemStatus, NodeStatus, Problem, WorkflowDag, WorkflowNode};
use crate::snapshot::{load_agents, load_costs, load_dag, load_items, load_optional};
use crate::{Error, Result};

/// Command results that can be serialized to JSON or formatted for humans.
pub trait CommandResult {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

fn json<T: Serialize>(value: &T) -> String {
    json_or_error(serde_json::to_string(value))
}

fn json_or_error<E: std::fmt::Display>(rendered: std::result::Result<String, E>) -> String {
    rendered.unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() }).to_string())
}

// === Shared views ===

/// Compact item view used in every list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemSummary {
    pub id: String,
    pub title: String,
    pub status: ItemStatus,
    pub priority: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
}

impl From<&Item> for ItemSummary {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id.clone(),
            title: item.title.clone(),
            status: item.status.clone(),
            priority: item.priority,
            assignee: item.assignee.clone(),
        }
    }
}

impl ItemSummary {
    fn line(&self) -> String {
        let mut line = format!("{} [P{}] {}", self.id, self.priority, self.title);
        if let Some(ref who) = self.assignee {
            let _ = write!(line, " ({})", who);
        }
        line
    }
}

// === parade ===

#[derive(Debug, Clone, Serialize)]
pub struct GroupView {
    pub group: ParadeGroup,
    pub label: String,
    pub count: usize,
    pub items: Vec<ItemSummary>,
}

/// Result of `parade`.
#[derive(Debug, Clone, Serialize)]
pub struct ParadeResult {
    pub total: usize,
    pub groups: Vec<GroupView>,
}

impl CommandResult for ParadeResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut lines = Vec::new();
        for group in &self.groups {
            lines.push(format!("{} ({})", group.label, group.count));
            for item in &group.items {
                lines.push(format!("  {}", item.line()));
            }
        }
        lines.join("\n")
    }
}

/// Group the issue snapshot by lifecycle.
pub fn parade(config: &ResolvedConfig) -> Result<ParadeResult> {
    let items = load_items(config.issues())?;
    Ok(parade_items(&items, config))
}

fn parade_items(items: &[Item], config: &ResolvedConfig) -> ParadeResult {
    let groups = group_by_parade(items, &config.blocking_types());
    ParadeResult {
        total: items.len(),
        groups: groups
            .iter()
            .map(|(group, members)| GroupView {
                group: *group,
                label: group.label().to_string(),
                count: members.len(),
                items: members.iter().map(|item| ItemSummary::from(*item)).collect(),
            })
            .collect(),
    }
}

// === focus ===

#[derive(Debug, Clone, Serialize)]
pub struct FocusItem {
    pub bucket: FocusBucket,
    #[serde(flatten)]
    pub item: ItemSummary,
}

/// Result of `focus`.
#[derive(Debug, Clone, Serialize)]
pub struct FocusResult {
    /// Operator the list was computed for, empty when unknown
    pub user: String,
    pub count: usize,
    pub items: Vec<FocusItem>,
}

impl CommandResult for FocusResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.items.is_empty() {
            return "Nothing to focus on.".to_string();
        }
        let mut lines = Vec::new();
        let mut current: Option<FocusBucket> = None;
        for entry in &self.items {
            if current != Some(entry.bucket) {
                lines.push(entry.bucket.label().to_string());
                current = Some(entry.bucket);
            }
            lines.push(format!("  {}", entry.item.line()));
        }
        lines.join("\n")
    }
}

/// Compute the focus list for the configured operator.
pub fn focus(config: &ResolvedConfig, caps: FocusCaps) -> Result<FocusResult> {
    let items = load_items(config.issues())?;
    Ok(focus_items(&items, config, caps))
}

fn focus_items(items: &[Item], config: &ResolvedConfig, caps: FocusCaps) -> FocusResult {
    let entries: Vec<FocusItem> = focus_buckets(items, &config.blocking_types(), config.user(), caps)
        .labelled()
        .into_iter()
        .map(|(bucket, item)| FocusItem {
            bucket,
            item: item.into(),
        })
        .collect();
    FocusResult {
        user: config.user().to_string(),
        count: entries.len(),
        items: entries,
    }
}

// === deps ===

/// Result of `deps`.
#[derive(Debug, Clone, Serialize)]
pub struct DepsResult {
    pub id: String,
    pub title: String,
    pub status: ItemStatus,
    pub is_blocked: bool,
    pub next_blocker_id: Option<String>,
    pub edges: Vec<ClassifiedEdge>,
    pub blocking_ids: Vec<String>,
    pub resolved_ids: Vec<String>,
    pub missing_ids: Vec<String>,
    /// Open blockers followed by missing targets
    pub blocked_by: Vec<String>,
    /// Items that declare a blocking edge onto this one
    pub blocks: Vec<String>,
}

impl CommandResult for DepsResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut lines = vec![format!("{} {} [{}]", self.id, self.title, self.status)];
        if self.is_blocked {
            let next = self.next_blocker_id.as_deref().unwrap_or("?");
            lines.push(format!("Blocked (next blocker: {})", next));
        } else {
            lines.push("Not blocked".to_string());
        }
        if self.edges.is_empty() {
            lines.push("No dependencies.".to_string());
        } else {
            lines.push("Dependencies:".to_string());
            for edge in &self.edges {
                lines.push(format!("  {} {} ({})", edge.dep_type, edge.target_id, edge.class));
            }
        }
        if !self.blocks.is_empty() {
            lines.push(format!("Blocks: {}", self.blocks.join(", ")));
        }
        lines.join("\n")
    }
}

/// Dependency evaluation for a single item.
pub fn deps(config: &ResolvedConfig, id: &str) -> Result<DepsResult> {
    let items = load_items(config.issues())?;
    deps_for(&items, config, id)
}

fn deps_for(items: &[Item], config: &ResolvedConfig, id: &str) -> Result<DepsResult> {
    let index = build_index(items);
    let item = index
        .get(id)
        .copied()
        .ok_or_else(|| Error::NotFound(format!("Item not found: {}", id)))?;
    let types = config.blocking_types();

    let DepEval {
        edges,
        blocking_ids,
        resolved_ids,
        missing_ids,
        is_blocked,
        next_blocker_id,
        ..
    } = evaluate(item, &index, &types);

    Ok(DepsResult {
        id: item.id.clone(),
        title: item.title.clone(),
        status: item.status.clone(),
        is_blocked,
        next_blocker_id,
        edges,
        blocking_ids,
        resolved_ids,
        missing_ids,
        blocked_by: blocked_by_ids(item, &index, &types),
        blocks: blocks_ids(item, items, &types),
    })
}

// === dag ===

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeView {
    pub id: String,
    pub title: String,
    pub status: NodeStatus,
    pub critical: bool,
    pub active: bool,
}

/// Owned rendering of one workflow row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowView {
    Single { node: NodeView },
    Parallel { nodes: Vec<NodeView> },
    Connector,
}

/// Result of `dag`, also embedded in `summary`.
#[derive(Debug, Clone, Serialize)]
pub struct DagResult {
    pub rows: Vec<RowView>,
    pub critical_path: Vec<String>,
    pub active_step: Option<String>,
}

impl DagResult {
    fn from_dag(dag: Option<&WorkflowDag>, rows: &[DagRow<'_>], active_step: Option<String>) -> Self {
        let critical = critical_path_set(dag);
        let view = |node: &WorkflowNode| NodeView {
            id: node.id.clone(),
            title: node.title.clone(),
            status: node.status,
            critical: critical.contains(node.id.as_str()),
            active: active_step.as_deref() == Some(node.id.as_str()),
        };
        let rows = rows
            .iter()
            .map(|row| match row {
                DagRow::Single { node } => RowView::Single { node: view(*node) },
                DagRow::Parallel { nodes } => RowView::Parallel {
                    nodes: nodes.iter().map(|n| view(*n)).collect(),
                },
                DagRow::Connector => RowView::Connector,
            })
            .collect();

        Self {
            rows,
            critical_path: critical_path_titles(dag),
            active_step,
        }
    }

    fn human_lines(&self) -> Vec<String> {
        let node_label = |n: &NodeView| {
            let marker = if n.active {
                "▶ "
            } else if n.critical {
                "* "
            } else {
                ""
            };
            format!("{}{} [{}]", marker, n.title, n.status)
        };

        let mut lines = Vec::new();
        for row in &self.rows {
            match row {
                RowView::Single { node } => lines.push(format!("  {}", node_label(node))),
                RowView::Parallel { nodes } => {
                    let labels: Vec<String> = nodes.iter().map(node_label).collect();
                    lines.push(format!("  {}", labels.join(" | ")));
                }
                RowView::Connector => lines.push("  │".to_string()),
            }
        }
        if !self.critical_path.is_empty() {
            lines.push(format!(
                "Critical path: {}",
                self.critical_path.join(crate::engine::dag_layout::CRITICAL_PATH_SEPARATOR)
            ));
        }
        lines
    }
}

impl CommandResult for DagResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.rows.is_empty() {
            return "Workflow is empty.".to_string();
        }
        self.human_lines().join("\n")
    }
}

/// Lay out a workflow graph file.
pub fn dag(path: &Path) -> Result<DagResult> {
    let dag = load_dag(path)?;
    let rows = crate::engine::layout_dag(Some(&dag));
    let active = crate::engine::active_step_id(Some(&dag));
    Ok(DagResult::from_dag(Some(&dag), &rows, active))
}

// === problems ===

/// Result of `problems`.
#[derive(Debug, Clone, Serialize)]
pub struct ProblemsResult {
    pub agents: usize,
    pub count: usize,
    pub problems: Vec<Problem>,
}

fn problem_lines(problems: &[Problem]) -> Vec<String> {
    problems
        .iter()
        .map(|p| format!("  [{}] {} {}: {}", p.severity, p.agent, p.kind, p.detail))
        .collect()
}

impl CommandResult for ProblemsResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.problems.is_empty() {
            return format!("No problems across {} agent(s).", self.agents);
        }
        let mut lines = vec![format!("{} problem(s) across {} agent(s):", self.count, self.agents)];
        lines.extend(problem_lines(&self.problems));
        lines.join("\n")
    }
}

/// Scan an agent snapshot file for problems.
pub fn problems(path: &Path) -> Result<ProblemsResult> {
    let agents = load_agents(path)?;
    let problems = crate::engine::detect_problems(Some(agents.as_slice()));
    Ok(ProblemsResult {
        agents: agents.len(),
        count: problems.len(),
        problems,
    })
}

// === velocity ===

/// Result of `velocity`.
#[derive(Debug, Clone, Serialize)]
pub struct VelocityResult {
    /// Reference time the boundaries were computed from
    pub now: DateTime<FixedOffset>,
    #[serde(flatten)]
    pub metrics: VelocityMetrics,
}

fn velocity_lines(m: &VelocityMetrics) -> Vec<String> {
    vec![
        format!("Open: {}", m.open_count),
        format!("Created: {} today, {} this week", m.created_today, m.created_week),
        format!("Closed: {} today, {} this week", m.closed_today, m.closed_week),
        format!("Agents: {} working of {}", m.working_agents, m.total_agents),
        format!(
            "Cost: ${:.2} today, ${:.2} total over {} session(s)",
            m.today_cost_usd, m.total_cost_usd, m.session_count
        ),
    ]
}

impl CommandResult for VelocityResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        velocity_lines(&self.metrics).join("\n")
    }
}

/// Throughput relative to `now` (local clock when `None`).
pub fn velocity(
    config: &ResolvedConfig,
    agents: Option<&Path>,
    costs: Option<&Path>,
    now: Option<DateTime<FixedOffset>>,
) -> Result<VelocityResult> {
    let items = load_items(config.issues())?;
    let agents = load_optional(agents, load_agents)?;
    let costs = load_optional(costs, load_costs)?;

    // Day and week starts need the zone's own offsets, not today's.
    Ok(match now {
        Some(now) => velocity_items(&items, agents.as_deref(), costs.as_ref(), &now),
        None => velocity_items(&items, agents.as_deref(), costs.as_ref(), &Local::now()),
    })
}

fn velocity_items<Tz: TimeZone>(
    items: &[Item],
    agents: Option<&[AgentRuntime]>,
    costs: Option<&CostSnapshot>,
    now: &DateTime<Tz>,
) -> VelocityResult {
    VelocityResult {
        now: now.fixed_offset(),
        metrics: crate::engine::compute_velocity(items, agents, costs, now),
    }
}

// === changes ===

/// Result of `changes`.
#[derive(Debug, Clone, Serialize)]
pub struct ChangesResult {
    /// True when no previous state existed and this run only recorded one
    pub baseline: bool,
    pub tracked: usize,
    pub changes: Vec<StatusChange>,
}

impl CommandResult for ChangesResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.baseline {
            return format!("Recorded baseline for {} item(s).", self.tracked);
        }
        if self.changes.is_empty() {
            return "No status changes.".to_string();
        }
        self.changes
            .iter()
            .map(|c| format!("{} {}", c.describe(), c.title))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn read_seen(path: &Path) -> Result<SeenStatuses> {
    if !path.exists() {
        return Ok(SeenStatuses::new());
    }
    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(SeenStatuses::new());
    }
    serde_json::from_str(&content).map_err(|e| Error::Snapshot {
        path: path.to_path_buf(),
        line: e.line(),
        message: e.to_string(),
    })
}

fn write_seen(path: &Path, seen: &SeenStatuses) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let ordered: BTreeMap<&String, &ItemStatus> = seen.iter().collect();
    std::fs::write(path, serde_json::to_string_pretty(&ordered)?)?;
    Ok(())
}

/// Compare the snapshot with the statuses stored at `state`, then update it.
pub fn changes(config: &ResolvedConfig, state: &Path) -> Result<ChangesResult> {
    let items = load_items(config.issues())?;
    let previous = read_seen(state)?;
    let diff = detect_status_changes(&previous, &items);
    write_seen(state, &diff.seen)?;

    Ok(ChangesResult {
        baseline: previous.is_empty(),
        tracked: diff.seen.len(),
        changes: diff.changes,
    })
}

// === summary ===

#[derive(Debug, Clone, Serialize)]
pub struct FocusRef {
    pub bucket: FocusBucket,
    pub id: String,
}

/// Result of `summary`.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryResult {
    pub now: DateTime<FixedOffset>,
    /// Item IDs per lifecycle group
    pub parade: BTreeMap<ParadeGroup, Vec<String>>,
    pub focus: Vec<FocusRef>,
    pub problems: Vec<Problem>,
    pub workflow: DagResult,
    pub critical_path: String,
    pub velocity: VelocityMetrics,
}

impl CommandResult for SummaryResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut lines = Vec::new();

        let groups: Vec<String> = self
            .parade
            .iter()
            .map(|(group, ids)| format!("{} {}", group.label(), ids.len()))
            .collect();
        lines.push(format!("Parade: {}", groups.join(" · ")));

        if self.focus.is_empty() {
            lines.push("Focus: nothing".to_string());
        } else {
            let focus: Vec<String> = self
                .focus
                .iter()
                .map(|f| format!("{} ({})", f.id, f.bucket.label()))
                .collect();
            lines.push(format!("Focus: {}", focus.join(", ")));
        }

        if self.problems.is_empty() {
            lines.push("Problems: none".to_string());
        } else {
            lines.push(format!("Problems: {}", self.problems.len()));
            lines.extend(problem_lines(&self.problems));
        }

        if !self.workflow.rows.is_empty() {
            lines.push("Workflow:".to_string());
            lines.extend(self.workflow.human_lines());
        }

        lines.extend(velocity_lines(&self.velocity));
        lines.join("\n")
    }
}

/// Every derived view for one refresh.
pub fn summary(
    config: &ResolvedConfig,
    agents: Option<&Path>,
    costs: Option<&Path>,
    dag: Option<&Path>,
    now: Option<DateTime<FixedOffset>>,
) -> Result<SummaryResult> {
    let items = load_items(config.issues())?;
    let agents = load_optional(agents, load_agents)?;
    let costs = load_optional(costs, load_costs)?;
    let dag = load_optional(dag, load_dag)?;
    let blocking_types = config.blocking_types();

    let input = DashboardInput {
        items: &items,
        agents: agents.as_deref(),
        costs: costs.as_ref(),
        dag: dag.as_ref(),
        blocking_types: &blocking_types,
        current_user: config.user(),
        caps: config.focus_caps(),
    };
    Ok(match now {
        Some(now) => summary_of(&input, &now),
        None => summary_of(&input, &Local::now()),
    })
}

fn summary_of<Tz: TimeZone>(input: &DashboardInput<'_>, now: &DateTime<Tz>) -> SummaryResult {
    let dashboard = Dashboard::derive(input, now);

    SummaryResult {
        now: now.fixed_offset(),
        parade: dashboard
            .parade
            .iter()
            .map(|(group, members)| (*group, members.iter().map(|item| item.id.clone()).collect()))
            .collect(),
        focus: dashboard
            .focus
            .iter()
            .map(|entry| FocusRef {
                bucket: entry.bucket,
                id: entry.item.id.clone(),
            })
            .collect(),
        workflow: DagResult::from_dag(input.dag, &dashboard.dag_rows, dashboard.active_step.clone()),
        critical_path: dashboard.critical_path,
        problems: dashboard.problems,
        velocity: dashboard.velocity,
    }
}

// === config ===

/// Result of `config show`.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigShowResult {
    pub path: PathBuf,
    pub exists: bool,
    pub config: ResolvedConfig,
}

impl CommandResult for ConfigShowResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let c = &self.config;
        let user = match &c.user {
            Some(r) => format!("{} ({})", r.value, r.source),
            None => "(unset)".to_string(),
        };
        let exists = if self.exists { "" } else { " (not found)" };
        [
            format!("Config file: {}{}", self.path.display(), exists),
            format!(
                "blocking-types: {} ({})",
                c.blocking_types.value.join(", "),
                c.blocking_types.source
            ),
            format!("user: {}", user),
            format!("output-format: {} ({})", c.output_format.value, c.output_format.source),
            format!("focus-ready-cap: {} ({})", c.focus_ready_cap.value, c.focus_ready_cap.source),
            format!(
                "focus-blocked-cap: {} ({})",
                c.focus_blocked_cap.value, c.focus_blocked_cap.source
            ),
            format!("issues: {} ({})", c.issues.value.display(), c.issues.source),
        ]
        .join("\n")
    }
}

/// Show the resolved configuration.
pub fn config_show(config: &ResolvedConfig) -> Result<ConfigShowResult> {
    let path = config_path()?;
    Ok(ConfigShowResult {
        exists: path.exists(),
        path,
        config: config.clone(),
    })
}

/// Result of `config path`.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigPathResult {
    pub path: PathBuf,
    pub exists: bool,
}

impl CommandResult for ConfigPathResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        self.path.display().to_string()
    }
}

/// Locate config.kdl.
pub fn config_path_info() -> Result<ConfigPathResult> {
    let path = config_path()?;
    Ok(ConfigPathResult {
        exists: path.exists(),
        path,
    })
}
