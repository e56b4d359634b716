//! Lifecycle grouping for the primary list view.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::deps::{BlockingTypes, ItemIndex, build_index, evaluate};
use crate::models::{Item, ItemStatus};

/// Lifecycle bucket an item is shown under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParadeGroup {
    /// In progress and unblocked
    Rolling,
    /// Open and unblocked
    LinedUp,
    /// Open or in progress, but blocked
    Stalled,
    /// Closed
    PastTheStand,
}

impl ParadeGroup {
    /// All groups in display order.
    pub fn all() -> &'static [ParadeGroup] {
        &[
            ParadeGroup::Rolling,
            ParadeGroup::LinedUp,
            ParadeGroup::Stalled,
            ParadeGroup::PastTheStand,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            ParadeGroup::Rolling => "Rolling",
            ParadeGroup::LinedUp => "Lined Up",
            ParadeGroup::Stalled => "Stalled",
            ParadeGroup::PastTheStand => "Past the Stand",
        }
    }
}

impl fmt::Display for ParadeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Items per group. Every group key is always present.
pub type ParadeGroups<'a> = BTreeMap<ParadeGroup, Vec<&'a Item>>;

/// Decide the group of one item given its blocked state.
///
/// Blocked always wins over in-progress. Unknown statuses fall back to
/// `LinedUp`.
pub fn parade_group(status: &ItemStatus, blocked: bool) -> ParadeGroup {
    match status {
        ItemStatus::Closed => ParadeGroup::PastTheStand,
        ItemStatus::InProgress | ItemStatus::Open if blocked => ParadeGroup::Stalled,
        ItemStatus::InProgress => ParadeGroup::Rolling,
        ItemStatus::Open | ItemStatus::Other(_) => ParadeGroup::LinedUp,
    }
}

/// Group of one item against an existing index.
pub fn classify(item: &Item, index: &ItemIndex<'_>, blocking_types: &BlockingTypes) -> ParadeGroup {
    if item.is_closed() {
        return ParadeGroup::PastTheStand;
    }
    let blocked = evaluate(item, index, blocking_types).is_blocked;
    parade_group(&item.status, blocked)
}

/// Bucket a snapshot into the four parade groups, preserving input order
/// within each group.
pub fn group_by_parade<'a>(items: &'a [Item], blocking_types: &BlockingTypes) -> ParadeGroups<'a> {
    let index = build_index(items);
    let mut groups: ParadeGroups<'a> = ParadeGroup::all().iter().map(|g| (*g, Vec::new())).collect();

    for item in items {
        let group = classify(item, &index, blocking_types);
        groups.entry(group).or_default().push(item);
    }

    tracing::debug!(
        total = items.len(),
        rolling = groups[&ParadeGroup::Rolling].len(),
        lined_up = groups[&ParadeGroup::LinedUp].len(),
        stalled = groups[&ParadeGroup::Stalled].len(),
        past = groups[&ParadeGroup::PastTheStand].len(),
        "grouped items by parade"
    );

    groups
}
