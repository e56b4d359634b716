//! "What should I work on" prioritization.
//!
//! Open work is split into three buckets and capped:
//! - **MyWork** - in progress and held by the current user (or everyone's
//!   in-progress work when no user is known)
//! - **Ready** - unblocked work, most urgent first, at most `ready` entries
//! - **Blocked** - blocked work in snapshot order, at most `blocked` entries
//!
//! The result is always `MyWork ++ Ready ++ Blocked`.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::deps::{BlockingTypes, build_index, evaluate};
use crate::models::{Item, ItemStatus};

/// Default cap for the ready bucket.
pub const DEFAULT_READY_CAP: usize = 5;

/// Default cap for the blocked bucket.
pub const DEFAULT_BLOCKED_CAP: usize = 3;

/// Triage bucket of a focused item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusBucket {
    MyWork,
    Ready,
    Blocked,
}

impl FocusBucket {
    pub fn label(&self) -> &'static str {
        match self {
            FocusBucket::MyWork => "MY WORK",
            FocusBucket::Ready => "READY",
            FocusBucket::Blocked => "BLOCKED",
        }
    }
}

impl fmt::Display for FocusBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Maximum sizes for the capped buckets.
///
/// Only constructible through [`FocusCaps::new`], so both caps are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FocusCaps {
    pub(crate) ready: usize,
    blocked: usize,
}

impl FocusCaps {
    /// Create caps. Both must be at least 1.
    ///
    /// # Panics
    ///
    /// Panics on a zero cap; caps are caller-controlled constants.
    pub fn new(ready: usize, blocked: usize) -> Self {
        assert!(ready > 0, "focus ready cap must be at least 1");
        assert!(blocked > 0, "focus blocked cap must be at least 1");
        Self { ready, blocked }
    }

    pub fn ready(&self) -> usize {
        self.ready
    }

    pub fn blocked(&self) -> usize {
        self.blocked
    }
}

impl Default for FocusCaps {
    fn default() -> Self {
        Self::new(DEFAULT_READY_CAP, DEFAULT_BLOCKED_CAP)
    }
}

/// Bucketed focus view, before concatenation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FocusBuckets<'a> {
    pub my_work: Vec<&'a Item>,
    pub ready: Vec<&'a Item>,
    pub blocked: Vec<&'a Item>,
}

impl<'a> FocusBuckets<'a> {
    /// Concatenate buckets in display order.
    pub fn into_ordered(self) -> Vec<&'a Item> {
        let mut items = self.my_work;
        items.extend(self.ready);
        items.extend(self.blocked);
        items
    }

    /// Concatenate buckets in display order, tagging each item with its bucket.
    pub fn labelled(&self) -> Vec<(FocusBucket, &'a Item)> {
        let tag = |bucket: FocusBucket, items: &[&'a Item]| {
            items.iter().map(move |item| (bucket, *item)).collect::<Vec<_>>()
        };
        let mut out = tag(FocusBucket::MyWork, self.my_work.as_slice());
        out.extend(tag(FocusBucket::Ready, self.ready.as_slice()));
        out.extend(tag(FocusBucket::Blocked, self.blocked.as_slice()));
        out
    }

    pub fn len(&self) -> usize {
        self.my_work.len() + self.ready.len() + self.blocked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Bucket and cap open work for `current_user`.
///
/// An empty `current_user` means no identity is known, so every in-progress
/// item counts as the user's own.
pub fn focus_buckets<'a>(
    items: &'a [Item],
    blocking_types: &BlockingTypes,
    current_user: &str,
    caps: FocusCaps,
) -> FocusBuckets<'a> {
    let index = build_index(items);
    let mut buckets = FocusBuckets::default();

    for item in items.iter().filter(|item| !item.is_closed()) {
        let blocked = evaluate(item, &index, blocking_types).is_blocked;
        let mine = item.status == ItemStatus::InProgress
            && (current_user.is_empty() || item.is_held_by(current_user));

        if mine {
            buckets.my_work.push(item);
        } else if blocked {
            buckets.blocked.push(item);
        } else {
            buckets.ready.push(item);
        }
    }

    // Vec::sort_by_key is stable, so equal priorities keep snapshot order.
    buckets.ready.sort_by_key(|item| item.priority);
    buckets.ready.truncate(caps.ready());
    buckets.blocked.truncate(caps.blocked());

    tracing::debug!(
        user = current_user,
        my_work = buckets.my_work.len(),
        ready = buckets.ready.len(),
        blocked = buckets.blocked.len(),
        "computed focus buckets"
    );

    buckets
}

/// Focus list with the default caps.
pub fn focus_filter<'a>(items: &'a [Item], blocking_types: &BlockingTypes, current_user: &str) -> Vec<&'a Item> {
    focus_buckets(items, blocking_types, current_user, FocusCaps::default()).into_ordered()
}
