//! # Child-order Reconciliation
//!
//! Pure sequence algebra over merge keys: given the ancestor's child order
//! and the two branches' orders (already filtered to the keys that survive
//! the merge), compute the final order and whether the branches' reorderings
//! were compatible.
//!
//! The decision procedure:
//!
//! 1. If both branches agree on the relative order of the keys they share,
//!    take the local sequence as the spine and weave in remote-only keys.
//! 2. Otherwise, if only one branch reordered relative to base, adopt that
//!    branch's ordering intent and weave in the other side's additions.
//! 3. Otherwise the reorderings are irreconcilable: an order conflict is
//!    signalled and the preferred side's order wins.
//!
//! Weaving anchors each inserted key after its nearest predecessor that is
//! already in the spine, so additions keep their neighborhood.

use crate::index::MergeKey;
use std::collections::HashSet;

/// Outcome of order reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OrderOutcome {
    /// Final key order for the merged container.
    pub order: Vec<MergeKey>,
    /// Whether the branches reordered incompatibly.
    pub conflicted: bool,
}

/// Reconcile a container's child order across the three versions.
///
/// All three sequences must already be restricted to surviving keys; keys
/// may appear in only one branch (additions).
pub(crate) fn reconcile_order(
    base: &[MergeKey],
    local: &[MergeKey],
    remote: &[MergeKey],
    prefer_local: bool,
) -> OrderOutcome {
    let local_set: HashSet<&MergeKey> = local.iter().collect();
    let remote_set: HashSet<&MergeKey> = remote.iter().collect();
    let base_set: HashSet<&MergeKey> = base.iter().collect();

    // Projections onto the keys both branches can see.
    let local_shared: Vec<&MergeKey> =
        local.iter().filter(|k| remote_set.contains(*k)).collect();
    let remote_shared: Vec<&MergeKey> =
        remote.iter().filter(|k| local_set.contains(*k)).collect();

    if local_shared == remote_shared {
        return OrderOutcome {
            order: weave(local.to_vec(), remote),
            conflicted: false,
        };
    }

    let local_reordered = projection_differs(base, local, &base_set, &local_set);
    let remote_reordered = projection_differs(base, remote, &base_set, &remote_set);

    if !local_reordered {
        // Only remote expressed an ordering intent.
        return OrderOutcome {
            order: weave(remote.to_vec(), local),
            conflicted: false,
        };
    }
    if !remote_reordered {
        return OrderOutcome {
            order: weave(local.to_vec(), remote),
            conflicted: false,
        };
    }

    // Both reordered, incompatibly: the preferred side's order stands.
    let (spine, other) = if prefer_local {
        (local.to_vec(), remote)
    } else {
        (remote.to_vec(), local)
    };
    OrderOutcome {
        order: weave(spine, other),
        conflicted: true,
    }
}

/// Whether `branch` reordered the keys it shares with `base`.
fn projection_differs(
    base: &[MergeKey],
    branch: &[MergeKey],
    base_set: &HashSet<&MergeKey>,
    branch_set: &HashSet<&MergeKey>,
) -> bool {
    let base_proj: Vec<&MergeKey> = base.iter().filter(|k| branch_set.contains(*k)).collect();
    let branch_proj: Vec<&MergeKey> = branch.iter().filter(|k| base_set.contains(*k)).collect();
    base_proj != branch_proj
}

/// Insert every key of `other` that is missing from `spine`, each anchored
/// directly after its nearest preceding `other`-key already present.
fn weave(spine: Vec<MergeKey>, other: &[MergeKey]) -> Vec<MergeKey> {
    let mut out = spine;
    let mut anchor: Option<usize> = None;
    for key in other {
        if let Some(pos) = out.iter().position(|k| k == key) {
            anchor = Some(pos);
            continue;
        }
        let insert_at = anchor.map_or(0, |pos| pos + 1);
        out.insert(insert_at, key.clone());
        anchor = Some(insert_at);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(names: &[&str]) -> Vec<MergeKey> {
        names
            .iter()
            .map(|n| MergeKey::Semantic((*n).to_string()))
            .collect()
    }

    #[test]
    fn test_no_reorder_anywhere() {
        let order = keys(&["a", "b", "c"]);
        let outcome = reconcile_order(&order, &order, &order, true);
        assert!(!outcome.conflicted);
        assert_eq!(outcome.order, order);
    }

    #[test]
    fn test_one_sided_reorder_adopted() {
        let base = keys(&["a", "b", "c"]);
        let local = keys(&["b", "a", "c"]);
        let outcome = reconcile_order(&base, &local, &base, true);
        assert!(!outcome.conflicted);
        assert_eq!(outcome.order, local);

        // Symmetric: remote reorders.
        let outcome = reconcile_order(&base, &base, &local, true);
        assert!(!outcome.conflicted);
        assert_eq!(outcome.order, local);
    }

    #[test]
    fn test_identical_reorder_accepted_once() {
        let base = keys(&["a", "b", "c"]);
        let both = keys(&["c", "a", "b"]);
        let outcome = reconcile_order(&base, &both, &both, true);
        assert!(!outcome.conflicted);
        assert_eq!(outcome.order, both);
    }

    #[test]
    fn test_incompatible_reorder_prefers_local() {
        let base = keys(&["a", "b", "c"]);
        let local = keys(&["b", "a", "c"]);
        let remote = keys(&["a", "c", "b"]);
        let outcome = reconcile_order(&base, &local, &remote, true);
        assert!(outcome.conflicted);
        assert_eq!(outcome.order, local);
    }

    #[test]
    fn test_incompatible_reorder_prefer_remote_side() {
        let base = keys(&["a", "b", "c"]);
        let local = keys(&["b", "a", "c"]);
        let remote = keys(&["a", "c", "b"]);
        let outcome = reconcile_order(&base, &local, &remote, false);
        assert!(outcome.conflicted);
        assert_eq!(outcome.order, remote);
    }

    #[test]
    fn test_additions_weave_after_anchor() {
        let base = keys(&["a", "b"]);
        // Local inserted x between a and b; remote inserted y after b.
        let local = keys(&["a", "x", "b"]);
        let remote = keys(&["a", "b", "y"]);
        let outcome = reconcile_order(&base, &local, &remote, true);
        assert!(!outcome.conflicted);
        assert_eq!(outcome.order, keys(&["a", "x", "b", "y"]));
    }

    #[test]
    fn test_addition_at_front() {
        let base = keys(&["a"]);
        let local = keys(&["a"]);
        let remote = keys(&["z", "a"]);
        let outcome = reconcile_order(&base, &local, &remote, true);
        assert!(!outcome.conflicted);
        assert_eq!(outcome.order, keys(&["z", "a"]));
    }

    #[test]
    fn test_removal_is_not_a_reorder() {
        // Local removed b; remote left everything alone. The inputs are
        // already restricted to surviving keys, so both branches see the
        // same two-element sequence.
        let base = keys(&["a", "b", "c"]);
        let survivors = keys(&["a", "c"]);
        let outcome = reconcile_order(&base, &survivors, &survivors, true);
        assert!(!outcome.conflicted);
        assert_eq!(outcome.order, keys(&["a", "c"]));
    }
}
