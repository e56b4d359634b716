//! Derived-state engine.
//!
//! Pure, synchronous functions that turn raw snapshots into the views a
//! dashboard renders:
//! - [`deps`] - per-item dependency classification
//! - [`parade`] - lifecycle grouping
//! - [`focus`] - capped "what next" prioritization
//! - [`dag_layout`] - workflow graph rows and critical path
//! - [`problems`] - agent anomaly detection
//! - [`velocity`] - day/week throughput
//! - [`changes`] - status change detection between refreshes
//!
//! Nothing here keeps state between calls or touches disk or network. Every
//! call allocates fresh output from borrowed input.

pub mod changes;
pub mod dag_layout;
pub mod deps;
pub mod focus;
pub mod parade;
pub mod problems;
pub mod velocity;

pub use changes::{SeenStatuses, StatusChange, StatusDiff, detect_status_changes};
pub use dag_layout::{
    DagRow, active_step_id, critical_path_set, critical_path_string, critical_path_titles, layout_dag,
};
pub use deps::{
    BlockingTypes, ClassifiedEdge, DepEval, EdgeClass, ItemIndex, blocked_by_ids, blocks_ids, build_index,
    evaluate, is_blocked,
};
pub use focus::{FocusBucket, FocusBuckets, FocusCaps, focus_buckets, focus_filter};
pub use parade::{ParadeGroup, ParadeGroups, group_by_parade};
pub use problems::detect_problems;
pub use velocity::{VelocityMetrics, compute_velocity};

use chrono::{DateTime, TimeZone};
use serde::Serialize;

use crate::models::{AgentRuntime, CostSnapshot, Item, Problem, WorkflowDag};

/// Everything one refresh feeds the engine.
#[derive(Debug, Clone, Copy)]
pub struct DashboardInput<'a> {
    pub items: &'a [Item],
    pub agents: Option<&'a [AgentRuntime]>,
    pub costs: Option<&'a CostSnapshot>,
    pub dag: Option<&'a WorkflowDag>,
    pub blocking_types: &'a BlockingTypes,
    /// Empty when the operator's identity is unknown
    pub current_user: &'a str,
    pub caps: FocusCaps,
}

/// A focused item tagged with its bucket.
#[derive(Debug, Clone, Serialize)]
pub struct FocusEntry<'a> {
    pub bucket: FocusBucket,
    pub item: &'a Item,
}

/// All derived views for one refresh.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard<'a> {
    pub parade: ParadeGroups<'a>,
    pub focus: Vec<FocusEntry<'a>>,
    pub problems: Vec<Problem>,
    pub dag_rows: Vec<DagRow<'a>>,
    pub critical_path: String,
    pub active_step: Option<String>,
    pub velocity: VelocityMetrics,
}

impl<'a> Dashboard<'a> {
    /// Run every engine component once over `input`.
    pub fn derive<Tz: TimeZone>(input: &DashboardInput<'a>, now: &DateTime<Tz>) -> Self {
        let focus = focus_buckets(input.items, input.blocking_types, input.current_user, input.caps)
            .labelled()
            .into_iter()
            .map(|(bucket, item)| FocusEntry { bucket, item })
            .collect();

        Self {
            parade: group_by_parade(input.items, input.blocking_types),
            focus,
            problems: detect_problems(input.agents),
            dag_rows: layout_dag(input.dag),
            critical_path: critical_path_string(input.dag),
            active_step: active_step_id(input.dag),
            velocity: compute_velocity(input.items, input.agents, input.costs, now),
        }
    }
}
