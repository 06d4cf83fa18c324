//! # The Merge Engine
//!
//! Orchestrates a three-way merge: validates the inputs, builds the
//! correspondence indices, merges the artboard sequence, and inside it each
//! corresponding container, classifying every slot along the way:
//!
//! | Slot state | Action |
//! |------------|--------|
//! | unchanged / one-sided edit | take the surviving version |
//! | both sides identical edit | take it once |
//! | both sides divergent edit | field-level merge, `P-001` per field |
//! | edit vs delete | keep the edit, `S-001` |
//! | add vs add, same identity | take once if equal, else `C-001` |
//! | incompatible reorder | preferred side's order, `S-002` |
//!
//! A node present in one branch's container but absent there in the others
//! is resolved through the *global* correspondence index, which is how
//! cross-container moves keep their identity (and merge their concurrent
//! edits) instead of degenerating into delete + add.
//!
//! The merged document is re-validated before it is returned; an invalid
//! result is an engine invariant violation and aborts the merge without
//! leaking a partial document.

use crate::children::{reconcile_order, OrderOutcome};
use crate::conflict::{Conflict, ConflictCode, ConflictSink};
use crate::error::MergeError;
use crate::fields::merge_value;
use crate::index::{Correspondence, MergeKey};
use easel_ops::{diff, BudgetConfig, PatchOp};
use easel_schema::{validate, Artboard, Document, Node, NodeId};
use easel_tree::{find_by_id, stats};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};
use tracing::debug;

/// How divergent values are resolved in the merged document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// Keep the local value on divergence and report every conflict.
    #[default]
    ReportOnly,

    /// Same tie-break as `ReportOnly`; named explicitly for callers that
    /// auto-resolve toward local.
    PreferLocal,

    /// Flip the tie-break: remote wins divergent values and orderings.
    PreferRemote,
}

/// Merge configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeOptions {
    /// Tie-break policy.
    pub resolution: Resolution,

    /// Wall-time budget; expiry aborts with `Cancelled`.
    pub deadline_ms: Option<u64>,

    /// Stop *recording* conflicts after this many. Reconciliation itself
    /// continues, so the merged bytes do not depend on the cap.
    pub max_conflicts: Option<usize>,
}

/// The result of a successful merge.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    /// The merged document (always produced; conflicts do not prevent it).
    pub merged: Document,

    /// Patches transforming the base document into `merged`.
    pub patches_from_base: Vec<PatchOp>,

    /// Classified conflicts, in discovery order.
    pub conflicts: Vec<Conflict>,

    /// Whether `max_conflicts` dropped any records.
    pub conflicts_truncated: bool,
}

/// Shared merge state threaded through the recursion.
struct Ctx<'a> {
    corr: Correspondence,
    sink: ConflictSink,
    prefer_local: bool,
    deadline: Option<Instant>,
    /// Keys already placed in the merged document. Guards against a node
    /// materializing twice when branches moved it across containers.
    claimed: HashSet<MergeKey>,
    max_depth: usize,
    base_doc: &'a Document,
    local_doc: &'a Document,
    remote_doc: &'a Document,
}

impl<'a> Ctx<'a> {
    fn check_deadline(&self) -> Result<(), MergeError> {
        match self.deadline {
            Some(deadline) if Instant::now() > deadline => Err(MergeError::Cancelled),
            _ => Ok(()),
        }
    }

    fn base_node(&self, key: &MergeKey) -> Option<&'a Node> {
        self.corr
            .id_in_base(key)
            .and_then(|id| find_by_id(self.base_doc, id))
            .map(|visit| visit.node)
    }

    fn local_node(&self, key: &MergeKey) -> Option<&'a Node> {
        self.corr
            .id_in_local(key)
            .and_then(|id| find_by_id(self.local_doc, id))
            .map(|visit| visit.node)
    }

    fn remote_node(&self, key: &MergeKey) -> Option<&'a Node> {
        self.corr
            .id_in_remote(key)
            .and_then(|id| find_by_id(self.remote_doc, id))
            .map(|visit| visit.node)
    }
}

/// Three-way merge of two documents against their common ancestor.
///
/// All three inputs must be schema-valid and share the current schema
/// version. The merged document is always produced unless the merge aborts;
/// conflicts are reported alongside it and the caller chooses what to do
/// with them.
///
/// # Errors
///
/// [`MergeError::InvalidSchema`] for invalid inputs,
/// [`MergeError::BudgetExceeded`] for inputs beyond the depth budget,
/// [`MergeError::Cancelled`] on deadline expiry, and
/// [`MergeError::Aborted`] on internal invariant violations.
pub fn merge(
    base: &Document,
    local: &Document,
    remote: &Document,
    options: MergeOptions,
) -> Result<MergeOutcome, MergeError> {
    for (side, doc) in [("base", base), ("local", local), ("remote", remote)] {
        validate(doc).map_err(|source| MergeError::InvalidSchema { side, source })?;
        let tree = stats(doc);
        let budget = BudgetConfig::default();
        if tree.max_depth > budget.max_depth {
            return Err(MergeError::BudgetExceeded {
                message: format!(
                    "{side} document nesting depth {} exceeds budget of {}",
                    tree.max_depth, budget.max_depth
                ),
            });
        }
    }

    let deadline = options
        .deadline_ms
        .map(|ms| Instant::now() + Duration::from_millis(ms));
    let prefer_local = !matches!(options.resolution, Resolution::PreferRemote);

    // Identical branches merge to themselves, conflict-free.
    if local == remote {
        debug!("branches are identical; trivial merge");
        return Ok(MergeOutcome {
            patches_from_base: diff(&to_value(base), &to_value(local)),
            merged: local.clone(),
            conflicts: Vec::new(),
            conflicts_truncated: false,
        });
    }

    let mut ctx = Ctx {
        corr: Correspondence::build(base, local, remote),
        sink: ConflictSink::with_cap(options.max_conflicts),
        prefer_local,
        deadline,
        claimed: HashSet::new(),
        max_depth: BudgetConfig::default().max_depth,
        base_doc: base,
        local_doc: local,
        remote_doc: remote,
    };

    let mut merged = base.clone();
    if let Some(name) = merge_value(
        Some(&json!(base.name)),
        Some(&json!(local.name)),
        Some(&json!(remote.name)),
        None,
        "",
        "name",
        prefer_local,
        &mut ctx.sink,
    )
    .and_then(|v| v.as_str().map(str::to_string))
    {
        merged.name = name;
    }
    merged.artboards = merge_artboards(&mut ctx, base, local, remote)?;

    validate(&merged).map_err(|err| MergeError::Aborted {
        message: format!("merged document failed validation: {err}"),
    })?;

    let patches_from_base = diff(&to_value(base), &to_value(&merged));
    let (conflicts, conflicts_truncated) = ctx.sink.into_parts();
    debug!(
        conflicts = conflicts.len(),
        patches = patches_from_base.len(),
        "merge complete"
    );
    Ok(MergeOutcome {
        merged,
        patches_from_base,
        conflicts,
        conflicts_truncated,
    })
}

/// Merge the artboard sequences. Artboards correspond by identifier and
/// merge like containers whose fields are name / frame / background.
fn merge_artboards(
    ctx: &mut Ctx<'_>,
    base: &Document,
    local: &Document,
    remote: &Document,
) -> Result<Vec<Artboard>, MergeError> {
    let base_map: HashMap<NodeId, (usize, &Artboard)> = index_artboards(&base.artboards);
    let local_map = index_artboards(&local.artboards);
    let remote_map = index_artboards(&remote.artboards);

    let mut ordered_ids: Vec<NodeId> = base.artboards.iter().map(|ab| ab.id).collect();
    for ab in &local.artboards {
        if !base_map.contains_key(&ab.id) {
            ordered_ids.push(ab.id);
        }
    }
    for ab in &remote.artboards {
        if !base_map.contains_key(&ab.id) && !local_map.contains_key(&ab.id) {
            ordered_ids.push(ab.id);
        }
    }

    let mut survivors: HashMap<NodeId, Artboard> = HashMap::new();
    for id in &ordered_ids {
        let b = base_map.get(id);
        let l = local_map.get(id);
        let r = remote_map.get(id);
        let pointer = format!(
            "/artboards/{}",
            b.or(l).or(r).map(|(i, _)| *i).unwrap_or_default()
        );

        match (b, l, r) {
            (Some((bi, bab)), Some((_, lab)), Some((_, rab))) => {
                let merged = merge_artboard(ctx, bab, lab, rab, *bi)?;
                survivors.insert(*id, merged);
            }
            (Some((_, bab)), Some((_, lab)), None) => {
                if *bab != *lab {
                    ctx.sink.push(Conflict {
                        code: ConflictCode::EditDelete,
                        id: Some(*id),
                        pointer,
                        field: None,
                        base: Some(to_value(*bab)),
                        local: Some(to_value(*lab)),
                        remote: None,
                        message: format!(
                            "artboard \"{}\" was edited locally and deleted remotely; keeping the edit",
                            lab.name
                        ),
                    });
                    let taken = take_artboard(ctx, lab);
                    survivors.insert(*id, taken);
                }
            }
            (Some((_, bab)), None, Some((_, rab))) => {
                if *bab != *rab {
                    ctx.sink.push(Conflict {
                        code: ConflictCode::EditDelete,
                        id: Some(*id),
                        pointer,
                        field: None,
                        base: Some(to_value(*bab)),
                        local: None,
                        remote: Some(to_value(*rab)),
                        message: format!(
                            "artboard \"{}\" was edited remotely and deleted locally; keeping the edit",
                            rab.name
                        ),
                    });
                    let taken = take_artboard(ctx, rab);
                    survivors.insert(*id, taken);
                }
            }
            (Some(_), None, None) | (None, None, None) => {}
            (None, Some((_, lab)), Some((_, rab))) => {
                if *lab == *rab {
                    let taken = take_artboard(ctx, lab);
                    survivors.insert(*id, taken);
                } else {
                    ctx.sink.push(Conflict {
                        code: ConflictCode::DivergentAdd,
                        id: Some(*id),
                        pointer,
                        field: None,
                        base: None,
                        local: Some(to_value(*lab)),
                        remote: Some(to_value(*rab)),
                        message: format!(
                            "artboard \"{}\" was added on both sides with different content",
                            lab.name
                        ),
                    });
                    let chosen = if ctx.prefer_local { *lab } else { *rab };
                    let taken = take_artboard(ctx, chosen);
                    survivors.insert(*id, taken);
                }
            }
            (None, Some((_, lab)), None) => {
                let taken = take_artboard(ctx, lab);
                survivors.insert(*id, taken);
            }
            (None, None, Some((_, rab))) => {
                let taken = take_artboard(ctx, rab);
                survivors.insert(*id, taken);
            }
        }
    }

    // Final order over surviving artboards.
    let to_keys = |artboards: &[Artboard]| -> Vec<MergeKey> {
        artboards
            .iter()
            .filter(|ab| survivors.contains_key(&ab.id))
            .map(|ab| MergeKey::Id(ab.id))
            .collect()
    };
    let OrderOutcome { order, conflicted } = reconcile_order(
        &to_keys(&base.artboards),
        &to_keys(&local.artboards),
        &to_keys(&remote.artboards),
        ctx.prefer_local,
    );
    if conflicted {
        push_order_conflict(ctx, "/artboards", None, &order);
    }

    let mut out = Vec::with_capacity(order.len());
    for key in order {
        let MergeKey::Id(id) = key else {
            return Err(MergeError::Aborted {
                message: "artboard order produced a semantic key".to_string(),
            });
        };
        match survivors.remove(&id) {
            Some(artboard) => out.push(artboard),
            None => {
                return Err(MergeError::Aborted {
                    message: format!("artboard {id} vanished during ordering"),
                })
            }
        }
    }
    if !survivors.is_empty() {
        return Err(MergeError::Aborted {
            message: "artboard ordering dropped surviving artboards".to_string(),
        });
    }
    Ok(out)
}

fn merge_artboard(
    ctx: &mut Ctx<'_>,
    base: &Artboard,
    local: &Artboard,
    remote: &Artboard,
    base_index: usize,
) -> Result<Artboard, MergeError> {
    ctx.check_deadline()?;
    let pointer = format!("/artboards/{base_index}");

    let merged_fields = merge_value(
        Some(&artboard_fields(base)),
        Some(&artboard_fields(local)),
        Some(&artboard_fields(remote)),
        Some(base.id),
        &pointer,
        "",
        ctx.prefer_local,
        &mut ctx.sink,
    );
    let Some(Value::Object(mut map)) = merged_fields else {
        return Err(MergeError::Aborted {
            message: format!("artboard field merge at {pointer} produced a non-object"),
        });
    };

    let children = merge_children(
        ctx,
        &base.children,
        &local.children,
        &remote.children,
        &pointer,
        0,
    )?;

    map.insert("id".to_string(), json!(base.id.to_string()));
    map.insert("children".to_string(), to_value(&children));
    serde_json::from_value(Value::Object(map)).map_err(|err| MergeError::Aborted {
        message: format!("merged artboard at {pointer} is malformed: {err}"),
    })
}

/// Merge one container's child sequences.
fn merge_children(
    ctx: &mut Ctx<'_>,
    base_children: &[Node],
    local_children: &[Node],
    remote_children: &[Node],
    container_ptr: &str,
    depth: usize,
) -> Result<Vec<Node>, MergeError> {
    ctx.check_deadline()?;
    if depth > ctx.max_depth {
        return Err(MergeError::BudgetExceeded {
            message: format!(
                "merge depth {depth} exceeds budget of {} at {container_ptr}",
                ctx.max_depth
            ),
        });
    }

    let (base_keys, base_map) = key_sequence(ctx, base_children, container_ptr)?;
    let (local_keys, local_map) = key_sequence(ctx, local_children, container_ptr)?;
    let (remote_keys, remote_map) = key_sequence(ctx, remote_children, container_ptr)?;

    let mut ordered_union = base_keys.clone();
    for key in &local_keys {
        if !base_map.contains_key(key) {
            ordered_union.push(key.clone());
        }
    }
    for key in &remote_keys {
        if !base_map.contains_key(key) && !local_map.contains_key(key) {
            ordered_union.push(key.clone());
        }
    }

    let mut merged_nodes: HashMap<MergeKey, Node> = HashMap::new();
    for key in &ordered_union {
        if ctx.claimed.contains(key) {
            continue;
        }
        let b = base_map.get(key);
        let l = local_map.get(key);
        let r = remote_map.get(key);
        let slot_index = b.or(l).or(r).map(|(i, _)| *i).unwrap_or_default();
        let pointer = format!("{container_ptr}/children/{slot_index}");

        let merged = match (b, l, r) {
            (Some((_, bn)), Some((_, ln)), Some((_, rn))) => {
                ctx.claimed.insert(key.clone());
                Some(merge_node(ctx, bn, ln, rn, &pointer, depth)?)
            }
            (Some((_, bn)), Some((_, ln)), None) => {
                if ctx.corr.in_remote(key) {
                    // Remote moved it elsewhere; its destination container
                    // places (and content-merges) it.
                    None
                } else if *bn != *ln {
                    ctx.sink.push(Conflict {
                        code: ConflictCode::EditDelete,
                        id: Some(ln.id),
                        pointer: pointer.clone(),
                        field: None,
                        base: Some(to_value(*bn)),
                        local: Some(to_value(*ln)),
                        remote: None,
                        message: format!(
                            "\"{}\" was edited locally and deleted remotely; keeping the edit",
                            ln.name
                        ),
                    });
                    take_subtree(ctx, ln)
                } else {
                    None
                }
            }
            (Some((_, bn)), None, Some((_, rn))) => {
                if ctx.corr.in_local(key) {
                    None
                } else if *bn != *rn {
                    ctx.sink.push(Conflict {
                        code: ConflictCode::EditDelete,
                        id: Some(rn.id),
                        pointer: pointer.clone(),
                        field: None,
                        base: Some(to_value(*bn)),
                        local: None,
                        remote: Some(to_value(*rn)),
                        message: format!(
                            "\"{}\" was edited remotely and deleted locally; keeping the edit",
                            rn.name
                        ),
                    });
                    take_subtree(ctx, rn)
                } else {
                    None
                }
            }
            (Some(_), None, None) => None,
            (None, Some((_, ln)), Some((_, rn))) => {
                if let Some(bn) = ctx.base_node(key) {
                    // Both branches moved the node into this container.
                    ctx.claimed.insert(key.clone());
                    Some(merge_node(ctx, bn, ln, rn, &pointer, depth)?)
                } else if *ln == *rn {
                    take_subtree(ctx, ln)
                } else {
                    ctx.sink.push(Conflict {
                        code: ConflictCode::DivergentAdd,
                        id: Some(ln.id),
                        pointer: pointer.clone(),
                        field: None,
                        base: None,
                        local: Some(to_value(*ln)),
                        remote: Some(to_value(*rn)),
                        message: format!(
                            "\"{}\" was added on both sides with different content",
                            ln.name
                        ),
                    });
                    let chosen = if ctx.prefer_local { *ln } else { *rn };
                    take_subtree(ctx, chosen)
                }
            }
            (None, Some((_, ln)), None) => {
                place_single_side(ctx, key, ln, true, &pointer, depth)?
            }
            (None, None, Some((_, rn))) => {
                place_single_side(ctx, key, rn, false, &pointer, depth)?
            }
            (None, None, None) => unreachable!("key came from one of the sequences"),
        };
        if let Some(node) = merged {
            merged_nodes.insert(key.clone(), node);
        }
    }

    // Order reconciliation over the survivors of this container.
    let restrict = |keys: &[MergeKey]| -> Vec<MergeKey> {
        keys.iter()
            .filter(|k| merged_nodes.contains_key(*k))
            .cloned()
            .collect()
    };
    let OrderOutcome { order, conflicted } = reconcile_order(
        &restrict(&base_keys),
        &restrict(&local_keys),
        &restrict(&remote_keys),
        ctx.prefer_local,
    );
    if conflicted {
        push_order_conflict(ctx, container_ptr, None, &order);
    }

    let mut out = Vec::with_capacity(order.len());
    for key in &order {
        match merged_nodes.remove(key) {
            Some(node) => out.push(node),
            None => {
                return Err(MergeError::Aborted {
                    message: format!("node {key} vanished during ordering at {container_ptr}"),
                })
            }
        }
    }
    if !merged_nodes.is_empty() {
        return Err(MergeError::Aborted {
            message: format!(
                "child ordering at {container_ptr} dropped {} surviving node(s)",
                merged_nodes.len()
            ),
        });
    }
    Ok(out)
}

/// Place a node that, in this container, exists on one side only: a true
/// add, a cross-container move, or one leg of a cross-container add/add.
fn place_single_side(
    ctx: &mut Ctx<'_>,
    key: &MergeKey,
    node: &Node,
    from_local: bool,
    pointer: &str,
    depth: usize,
) -> Result<Option<Node>, MergeError> {
    let other = if from_local {
        ctx.remote_node(key)
    } else {
        ctx.local_node(key)
    };

    if let Some(bn) = ctx.base_node(key) {
        // Existed in the ancestor: this side moved it here.
        match other {
            Some(on) => {
                // The other branch kept it (possibly edited, elsewhere);
                // merge content, place here.
                ctx.claimed.insert(key.clone());
                let (ln, rn) = if from_local { (node, on) } else { (on, node) };
                Ok(Some(merge_node(ctx, bn, ln, rn, pointer, depth)?))
            }
            None => {
                // The other branch deleted it while this side moved or
                // edited it.
                if *node != *bn {
                    ctx.sink.push(Conflict {
                        code: ConflictCode::EditDelete,
                        id: Some(node.id),
                        pointer: pointer.to_string(),
                        field: None,
                        base: Some(to_value(bn)),
                        local: from_local.then(|| to_value(node)),
                        remote: (!from_local).then(|| to_value(node)),
                        message: format!(
                            "\"{}\" was edited on one side and deleted on the other; keeping the edit",
                            node.name
                        ),
                    });
                    Ok(take_subtree(ctx, node))
                } else {
                    // Pure move vs delete: the deletion wins.
                    Ok(None)
                }
            }
        }
    } else {
        match other {
            // Added on both sides, in different containers.
            Some(on) if *node == *on => Ok(take_subtree(ctx, node)),
            Some(on) => {
                ctx.sink.push(Conflict {
                    code: ConflictCode::DivergentAdd,
                    id: Some(node.id),
                    pointer: pointer.to_string(),
                    field: None,
                    base: None,
                    local: Some(to_value(if from_local { node } else { on })),
                    remote: Some(to_value(if from_local { on } else { node })),
                    message: format!(
                        "\"{}\" was added on both sides with different content",
                        node.name
                    ),
                });
                let keep_this_side = from_local == ctx.prefer_local;
                let chosen = if keep_this_side { node } else { on };
                Ok(take_subtree(ctx, chosen))
            }
            // A plain one-sided add.
            None => Ok(take_subtree(ctx, node)),
        }
    }
}

/// Merge a node present (by correspondence) in all three versions.
fn merge_node(
    ctx: &mut Ctx<'_>,
    base: &Node,
    local: &Node,
    remote: &Node,
    pointer: &str,
    depth: usize,
) -> Result<Node, MergeError> {
    ctx.check_deadline()?;

    // A kind change is a wholesale replacement, never a field merge.
    if local.kind() != remote.kind() || local.kind() != base.kind() {
        let chosen = if *local == *base {
            remote
        } else if *remote == *base {
            local
        } else {
            ctx.sink.push(Conflict {
                code: ConflictCode::DivergentProperty,
                id: Some(base.id),
                pointer: pointer.to_string(),
                field: Some("type".to_string()),
                base: Some(json!(base.kind().to_string())),
                local: Some(json!(local.kind().to_string())),
                remote: Some(json!(remote.kind().to_string())),
                message: format!("\"{}\" changed type divergently", base.name),
            });
            if ctx.prefer_local {
                local
            } else {
                remote
            }
        };
        return take_subtree(ctx, chosen).ok_or_else(|| MergeError::Aborted {
            message: format!("node at {pointer} was already placed elsewhere"),
        });
    }

    let merged_fields = merge_value(
        Some(&node_fields(base)),
        Some(&node_fields(local)),
        Some(&node_fields(remote)),
        Some(base.id),
        pointer,
        "",
        ctx.prefer_local,
        &mut ctx.sink,
    );
    let Some(Value::Object(mut map)) = merged_fields else {
        return Err(MergeError::Aborted {
            message: format!("node field merge at {pointer} produced a non-object"),
        });
    };
    map.insert("id".to_string(), json!(base.id.to_string()));
    map.insert("type".to_string(), json!(base.kind().to_string()));

    if let (Some(bc), Some(lc), Some(rc)) =
        (base.children(), local.children(), remote.children())
    {
        let children = merge_children(ctx, bc, lc, rc, pointer, depth + 1)?;
        map.insert("children".to_string(), to_value(&children));
    }

    serde_json::from_value(Value::Object(map)).map_err(|err| MergeError::Aborted {
        message: format!("merged node at {pointer} is malformed: {err}"),
    })
}

/// Key a child sequence, failing on duplicate correspondence keys (which
/// valid inputs cannot produce).
fn key_sequence<'n>(
    ctx: &Ctx<'_>,
    children: &'n [Node],
    container_ptr: &str,
) -> Result<(Vec<MergeKey>, HashMap<MergeKey, (usize, &'n Node)>), MergeError> {
    let mut keys = Vec::with_capacity(children.len());
    let mut map = HashMap::with_capacity(children.len());
    for (index, node) in children.iter().enumerate() {
        let key = ctx.corr.key_of(node);
        if map.insert(key.clone(), (index, node)).is_some() {
            return Err(MergeError::Aborted {
                message: format!("duplicate correspondence key {key} at {container_ptr}"),
            });
        }
        keys.push(key);
    }
    Ok((keys, map))
}

fn push_order_conflict(
    ctx: &mut Ctx<'_>,
    container_ptr: &str,
    id: Option<NodeId>,
    chosen: &[MergeKey],
) {
    let render = |keys: &[MergeKey]| -> Value {
        Value::Array(keys.iter().map(|k| json!(k.to_string())).collect())
    };
    let side = if ctx.prefer_local { "local" } else { "remote" };
    ctx.sink.push(Conflict {
        code: ConflictCode::OrderConflict,
        id,
        pointer: container_ptr.to_string(),
        field: None,
        base: None,
        local: None,
        remote: None,
        message: format!(
            "children of {container_ptr} were reordered incompatibly; keeping the {side} order {}",
            render(chosen)
        ),
    });
}

/// Take a subtree wholesale into the merged document: claim every key and
/// prune any descendant another container has already placed, so a node
/// never materializes twice. `None` means the root itself was already
/// placed.
fn take_subtree(ctx: &mut Ctx<'_>, node: &Node) -> Option<Node> {
    let key = ctx.corr.key_of(node);
    if ctx.claimed.contains(&key) {
        return None;
    }
    ctx.claimed.insert(key);

    let mut out = node.clone();
    if let Some(children) = out.children_mut() {
        let originals = std::mem::take(children);
        *children = originals
            .iter()
            .filter_map(|child| take_subtree(ctx, child))
            .collect();
    }
    Some(out)
}

/// [`take_subtree`] over a whole artboard taken wholesale.
fn take_artboard(ctx: &mut Ctx<'_>, artboard: &Artboard) -> Artboard {
    let mut out = artboard.clone();
    let originals = std::mem::take(&mut out.children);
    out.children = originals
        .iter()
        .filter_map(|child| take_subtree(ctx, child))
        .collect();
    out
}

fn index_artboards(artboards: &[Artboard]) -> HashMap<NodeId, (usize, &Artboard)> {
    artboards
        .iter()
        .enumerate()
        .map(|(i, ab)| (ab.id, (i, ab)))
        .collect()
}

/// Artboard JSON without identity or children.
fn artboard_fields(artboard: &Artboard) -> Value {
    let mut value = to_value(artboard);
    if let Some(map) = value.as_object_mut() {
        map.remove("id");
        map.remove("children");
    }
    value
}

/// Node JSON without identity, discriminant, or children.
fn node_fields(node: &Node) -> Value {
    let mut value = to_value(node);
    if let Some(map) = value.as_object_mut() {
        map.remove("id");
        map.remove("type");
        map.remove("children");
    }
    value
}

fn to_value<T: Serialize>(value: T) -> Value {
    serde_json::to_value(value).expect("document values serialize infallibly")
}
