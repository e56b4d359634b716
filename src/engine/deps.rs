//! Dependency classification.
//!
//! Every declared edge of an item is put in exactly one class:
//! - **Blocking** - blocking type, target exists and is not closed
//! - **Resolved** - blocking type, target exists and is closed
//! - **Missing** - blocking type, target is not in the snapshot
//! - **NonBlocking** - type outside the blocking set, target state irrelevant
//!
//! Duplicate `(type, target)` edges are collapsed before classification and
//! only the first occurrence survives. A missing target blocks: a dangling
//! reference is treated as unfinished work, not as an error.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};

use crate::models::{DEFAULT_BLOCKING_TYPE, Dependency, Item};

/// Lookup from item ID to item, borrowed from a snapshot.
pub type ItemIndex<'a> = HashMap<&'a str, &'a Item>;

/// Build the ID index for a snapshot.
///
/// If two items share an ID the later one wins.
pub fn build_index(items: &[Item]) -> ItemIndex<'_> {
    items.iter().map(|item| (item.id.as_str(), item)).collect()
}

/// Set of dependency types that can block an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockingTypes(HashSet<String>);

impl BlockingTypes {
    /// Build a set from any list of type names. Empty names are ignored.
    pub fn new<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            types
                .into_iter()
                .map(Into::into)
                .filter(|t: &String| !t.is_empty())
                .collect(),
        )
    }

    pub fn contains(&self, dep_type: &str) -> bool {
        self.0.contains(dep_type)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Type names in sorted order, for stable display.
    pub fn sorted(&self) -> Vec<String> {
        self.0.iter().cloned().collect::<BTreeSet<_>>().into_iter().collect()
    }
}

impl Default for BlockingTypes {
    fn default() -> Self {
        Self::new([DEFAULT_BLOCKING_TYPE])
    }
}

impl<S: Into<String>> FromIterator<S> for BlockingTypes {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Classification of a single dependency edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeClass {
    Blocking,
    Resolved,
    Missing,
    NonBlocking,
}

impl EdgeClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeClass::Blocking => "blocking",
            EdgeClass::Resolved => "resolved",
            EdgeClass::Missing => "missing",
            EdgeClass::NonBlocking => "non_blocking",
        }
    }
}

impl std::fmt::Display for EdgeClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A de-duplicated edge together with its classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedEdge {
    pub dep_type: String,
    pub target_id: String,
    pub class: EdgeClass,
}

/// Dependency evaluation for one item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepEval {
    /// De-duplicated edges in declaration order
    pub edges: Vec<ClassifiedEdge>,
    /// Targets that exist and are not closed
    pub blocking_ids: Vec<String>,
    /// Targets that exist and are closed
    pub resolved_ids: Vec<String>,
    /// Targets absent from the snapshot
    pub missing_ids: Vec<String>,
    /// Edges whose type is outside the blocking set
    pub non_blocking_edges: Vec<ClassifiedEdge>,
    pub is_blocked: bool,
    /// First blocking target, else first missing target
    pub next_blocker_id: Option<String>,
}

/// Classify every dependency edge of `item` against the snapshot index.
pub fn evaluate(item: &Item, index: &ItemIndex<'_>, blocking_types: &BlockingTypes) -> DepEval {
    let mut eval = DepEval::default();
    let mut seen: HashSet<(&str, &str)> = HashSet::new();

    for dep in &item.dependencies {
        if !seen.insert((dep.dep_type.as_str(), dep.target_id.as_str())) {
            continue;
        }

        let class = classify_edge(dep, index, blocking_types);
        let edge = ClassifiedEdge {
            dep_type: dep.dep_type.clone(),
            target_id: dep.target_id.clone(),
            class,
        };

        match class {
            EdgeClass::Blocking => eval.blocking_ids.push(dep.target_id.clone()),
            EdgeClass::Resolved => eval.resolved_ids.push(dep.target_id.clone()),
            EdgeClass::Missing => eval.missing_ids.push(dep.target_id.clone()),
            EdgeClass::NonBlocking => eval.non_blocking_edges.push(edge.clone()),
        }
        eval.edges.push(edge);
    }

    eval.is_blocked = !eval.blocking_ids.is_empty() || !eval.missing_ids.is_empty();
    eval.next_blocker_id = eval
        .blocking_ids
        .first()
        .or_else(|| eval.missing_ids.first())
        .cloned();

    tracing::trace!(
        item = %item.id,
        edges = eval.edges.len(),
        blocked = eval.is_blocked,
        "evaluated dependencies"
    );

    eval
}

fn classify_edge(dep: &Dependency, index: &ItemIndex<'_>, blocking_types: &BlockingTypes) -> EdgeClass {
    if !blocking_types.contains(&dep.dep_type) {
        return EdgeClass::NonBlocking;
    }
    match index.get(dep.target_id.as_str()) {
        None => EdgeClass::Missing,
        Some(target) if target.is_closed() => EdgeClass::Resolved,
        Some(_) => EdgeClass::Blocking,
    }
}

/// Returns true if `item` is blocked under the default blocking set.
pub fn is_blocked(item: &Item, index: &ItemIndex<'_>) -> bool {
    evaluate(item, index, &BlockingTypes::default()).is_blocked
}

/// IDs currently keeping `item` blocked: open targets first, then missing ones.
pub fn blocked_by_ids(item: &Item, index: &ItemIndex<'_>, blocking_types: &BlockingTypes) -> Vec<String> {
    let eval = evaluate(item, index, blocking_types);
    let mut ids = eval.blocking_ids;
    ids.extend(eval.missing_ids);
    ids
}

/// IDs of the other items that declare a blocking edge onto `item`.
///
/// Each dependent item is listed once, in snapshot order, whatever the target
/// item's own status.
pub fn blocks_ids(item: &Item, all_items: &[Item], blocking_types: &BlockingTypes) -> Vec<String> {
    all_items
        .iter()
        .filter(|other| other.id != item.id)
        .filter(|other| {
            other
                .dependencies
                .iter()
                .any(|dep| dep.target_id == item.id && blocking_types.contains(&dep.dep_type))
        })
        .map(|other| other.id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ItemStatus;

    fn item(id: &str, status: ItemStatus) -> Item {
        let mut item = Item::new(id, format!("Item {}", id));
        item.status = status;
        item
    }

    fn with_deps(mut item: Item, deps: &[(&str, &str)]) -> Item {
        item.dependencies = deps.iter().map(|(t, id)| Dependency::new(*t, *id)).collect();
        item
    }

    #[test]
    fn test_open_target_blocks() {
        let items = vec![
            with_deps(item("A", ItemStatus::Open), &[("blocks", "B")]),
            item("B", ItemStatus::InProgress),
        ];
        let index = build_index(&items);

        let eval = evaluate(&items[0], &index, &BlockingTypes::default());
        assert!(eval.is_blocked);
        assert_eq!(eval.blocking_ids, vec!["B"]);
        assert_eq!(eval.next_blocker_id.as_deref(), Some("B"));
        assert_eq!(eval.edges[0].class, EdgeClass::Blocking);
    }

    #[test]
    fn test_closed_target_resolves() {
        let items = vec![
            with_deps(item("C", ItemStatus::Open), &[("blocks", "D")]),
            item("D", ItemStatus::Closed),
        ];
        let index = build_index(&items);

        let eval = evaluate(&items[0], &index, &BlockingTypes::default());
        assert!(!eval.is_blocked);
        assert_eq!(eval.resolved_ids, vec!["D"]);
        assert!(eval.blocking_ids.is_empty());
        assert_eq!(eval.next_blocker_id, None);
    }

    #[test]
    fn test_missing_target_blocks() {
        let items = vec![with_deps(item("E", ItemStatus::Open), &[("blocks", "Z")])];
        let index = build_index(&items);

        let eval = evaluate(&items[0], &index, &BlockingTypes::default());
        assert!(eval.is_blocked);
        assert_eq!(eval.missing_ids, vec!["Z"]);
        assert_eq!(eval.next_blocker_id.as_deref(), Some("Z"));
    }

    #[test]
    fn test_non_blocking_type_ignores_target_state() {
        let items = vec![
            with_deps(item("A", ItemStatus::Open), &[("related", "B"), ("related", "gone")]),
            item("B", ItemStatus::Open),
        ];
        let index = build_index(&items);

        let eval = evaluate(&items[0], &index, &BlockingTypes::default());
        assert!(!eval.is_blocked);
        assert_eq!(eval.non_blocking_edges.len(), 2);
        assert!(eval.missing_ids.is_empty());
        assert!(eval.edges.iter().all(|e| e.class == EdgeClass::NonBlocking));
    }

    #[test]
    fn test_blocking_target_preferred_over_missing_for_next_blocker() {
        let items = vec![
            with_deps(item("A", ItemStatus::Open), &[("blocks", "gone"), ("blocks", "B")]),
            item("B", ItemStatus::Open),
        ];
        let index = build_index(&items);

        let eval = evaluate(&items[0], &index, &BlockingTypes::default());
        assert_eq!(eval.next_blocker_id.as_deref(), Some("B"));
        assert_eq!(eval.missing_ids, vec!["gone"]);
    }

    #[test]
    fn test_duplicate_edges_collapse_first_wins() {
        let deduped = vec![
            with_deps(item("A", ItemStatus::Open), &[("blocks", "B"), ("related", "B")]),
            item("B", ItemStatus::Open),
        ];
        let duplicated = vec![
            with_deps(
                item("A", ItemStatus::Open),
                &[("blocks", "B"), ("blocks", "B"), ("related", "B"), ("blocks", "B")],
            ),
            item("B", ItemStatus::Open),
        ];

        let a = evaluate(&deduped[0], &build_index(&deduped), &BlockingTypes::default());
        let b = evaluate(&duplicated[0], &build_index(&duplicated), &BlockingTypes::default());

        assert_eq!(a.edges.len(), b.edges.len());
        assert_eq!(a.blocking_ids, b.blocking_ids);
        assert_eq!(a.is_blocked, b.is_blocked);
        assert_eq!(b.edges[0].dep_type, "blocks");
        assert_eq!(b.edges[1].dep_type, "related");
    }

    #[test]
    fn test_custom_blocking_types() {
        let items = vec![
            with_deps(item("A", ItemStatus::Open), &[("parent-child", "P")]),
            item("P", ItemStatus::Open),
        ];
        let index = build_index(&items);

        assert!(!evaluate(&items[0], &index, &BlockingTypes::default()).is_blocked);

        let types = BlockingTypes::new(["blocks", "parent-child"]);
        assert!(evaluate(&items[0], &index, &types).is_blocked);
    }

    #[test]
    fn test_no_dependencies() {
        let items = vec![item("A", ItemStatus::Open)];
        let eval = evaluate(&items[0], &build_index(&items), &BlockingTypes::default());
        assert_eq!(eval, DepEval::default());
    }

    #[test]
    fn test_build_index_last_duplicate_wins() {
        let items = vec![item("A", ItemStatus::Open), item("A", ItemStatus::Closed)];
        let index = build_index(&items);
        assert_eq!(index.len(), 1);
        assert_eq!(index["A"].status, ItemStatus::Closed);
    }

    #[test]
    fn test_is_blocked_uses_default_set() {
        let items = vec![
            with_deps(item("A", ItemStatus::Open), &[("blocks", "B")]),
            with_deps(item("C", ItemStatus::Open), &[("tracks", "B")]),
            item("B", ItemStatus::Open),
        ];
        let index = build_index(&items);
        assert!(is_blocked(&items[0], &index));
        assert!(!is_blocked(&items[1], &index));
    }

    #[test]
    fn test_blocked_by_ids_lists_open_then_missing() {
        let items = vec![
            with_deps(
                item("A", ItemStatus::Open),
                &[("blocks", "gone"), ("blocks", "B"), ("blocks", "done")],
            ),
            item("B", ItemStatus::Open),
            item("done", ItemStatus::Closed),
        ];
        let index = build_index(&items);
        assert_eq!(
            blocked_by_ids(&items[0], &index, &BlockingTypes::default()),
            vec!["B", "gone"]
        );
    }

    #[test]
    fn test_blocks_ids_reverse_scan() {
        let items = vec![
            item("root", ItemStatus::Open),
            with_deps(item("x", ItemStatus::Open), &[("blocks", "root"), ("blocks", "root")]),
            with_deps(item("y", ItemStatus::Open), &[("related", "root")]),
            with_deps(item("z", ItemStatus::Closed), &[("blocks", "root")]),
        ];

        let ids = blocks_ids(&items[0], &items, &BlockingTypes::default());
        assert_eq!(ids, vec!["x", "z"]);
    }

    #[test]
    fn test_blocks_ids_skips_self_reference() {
        let items = vec![with_deps(item("A", ItemStatus::Open), &[("blocks", "A")])];
        assert!(blocks_ids(&items[0], &items, &BlockingTypes::default()).is_empty());
    }

    #[test]
    fn test_blocking_types_ignore_empty_names() {
        let types = BlockingTypes::new(["blocks", "", "parent-child"]);
        assert_eq!(types.len(), 2);
        assert_eq!(types.sorted(), vec!["blocks", "parent-child"]);
    }
}
