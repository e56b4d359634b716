//! Status change detection between refreshes.
//!
//! The caller owns the map of previously seen statuses and threads it from one
//! refresh to the next; this module only compares it against a new snapshot.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::{Item, ItemStatus};

/// Statuses as of the previous refresh, keyed by item ID.
pub type SeenStatuses = HashMap<String, ItemStatus>;

/// A status transition observed between two refreshes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub id: String,
    pub title: String,
    /// Previous status, `None` when the item is new since the last refresh
    pub from: Option<ItemStatus>,
    pub to: ItemStatus,
}

impl StatusChange {
    /// One-line description for notifications.
    pub fn describe(&self) -> String {
        match &self.from {
            Some(from) => format!("{} {} → {}", self.id, from, self.to),
            None => format!("{} new ({})", self.id, self.to),
        }
    }
}

/// Result of comparing a snapshot against the previous statuses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusDiff {
    /// Changes in snapshot order
    pub changes: Vec<StatusChange>,
    /// Statuses to pass as `previous` on the next refresh
    pub seen: SeenStatuses,
}

/// Compare `items` against `previous`.
///
/// An empty `previous` is the first refresh: it only establishes the baseline
/// and reports no changes. Items that disappeared are not reported.
pub fn detect_status_changes(previous: &SeenStatuses, items: &[Item]) -> StatusDiff {
    let baseline = previous.is_empty();
    let mut diff = StatusDiff::default();

    for item in items {
        let prior = previous.get(&item.id);
        let changed = match prior {
            Some(prior) => *prior != item.status,
            None => !baseline,
        };
        if changed {
            diff.changes.push(StatusChange {
                id: item.id.clone(),
                title: item.title.clone(),
                from: prior.cloned(),
                to: item.status.clone(),
            });
        }
        diff.seen.insert(item.id.clone(), item.status.clone());
    }

    if !diff.changes.is_empty() {
        tracing::debug!(changes = diff.changes.len(), "detected status changes");
    }
    diff
}
