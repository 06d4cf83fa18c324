//! # Structural Diff
//!
//! A deterministic diff between two JSON values, expressed as a patch
//! sequence. Objects compare key-wise (keys visited in sorted order so the
//! output is stable); arrays compare index-wise with tail inserts and
//! removes. The result applied to `base` always yields `target`.
//!
//! This is intentionally a *positional* diff: it does not try to detect
//! moves. The merge engine uses it to express the distance from a base
//! document to a merged document; operation patches, which know what they
//! changed, are constructed directly instead.

use crate::patch::{escape_token, PatchOp};
use serde_json::Value;

/// Compute a patch sequence transforming `base` into `target`.
#[must_use]
pub fn diff(base: &Value, target: &Value) -> Vec<PatchOp> {
    let mut out = Vec::new();
    diff_inner(base, target, String::new(), &mut out);
    out
}

fn diff_inner(base: &Value, target: &Value, pointer: String, out: &mut Vec<PatchOp>) {
    if base == target {
        return;
    }
    match (base, target) {
        (Value::Object(base_map), Value::Object(target_map)) => {
            let mut keys: Vec<&String> = base_map.keys().chain(target_map.keys()).collect();
            keys.sort_unstable();
            keys.dedup();
            for key in keys {
                let child_ptr = format!("{pointer}/{}", escape_token(key));
                match (base_map.get(key), target_map.get(key)) {
                    (Some(b), Some(t)) => diff_inner(b, t, child_ptr, out),
                    (Some(_), None) => out.push(PatchOp::Remove { path: child_ptr }),
                    (None, Some(t)) => out.push(PatchOp::Add {
                        path: child_ptr,
                        value: t.clone(),
                    }),
                    (None, None) => unreachable!("key came from one of the maps"),
                }
            }
        }
        (Value::Array(base_items), Value::Array(target_items)) => {
            let common = base_items.len().min(target_items.len());
            for i in 0..common {
                diff_inner(
                    &base_items[i],
                    &target_items[i],
                    format!("{pointer}/{i}"),
                    out,
                );
            }
            // Tail removes run back-to-front so earlier indices stay valid.
            for i in (common..base_items.len()).rev() {
                out.push(PatchOp::Remove {
                    path: format!("{pointer}/{i}"),
                });
            }
            for item in target_items.iter().skip(common) {
                out.push(PatchOp::Add {
                    path: format!("{pointer}/-"),
                    value: item.clone(),
                });
            }
        }
        _ => out.push(PatchOp::Replace {
            path: pointer,
            value: target.clone(),
        }),
    }
}
