//! # Patch Application and Inversion
//!
//! Strict RFC 6902 semantics: a patch sequence applies atomically. If any
//! operation fails (missing target, bad index, failed `test`), the whole
//! sequence is rejected and the input document is untouched.
//!
//! Inversion replays a sequence against the pre-image, recording for each
//! step the exact operation that undoes it, and returns the recordings in
//! reverse order. The round-trip identity
//! `apply(apply(d, p), invert(p, d)) == d` holds for every sequence this
//! module accepts.

use crate::error::PatchError;
use crate::patch::{parse_pointer, PatchOp};
use serde_json::Value;

/// Apply a patch sequence to a document value.
///
/// The input is cloned; on error the original is returned untouched by
/// virtue of never being mutated.
///
/// # Errors
///
/// Any [`PatchError`] from any operation rejects the whole sequence.
pub fn apply(doc: &Value, patches: &[PatchOp]) -> Result<Value, PatchError> {
    let mut out = doc.clone();
    for op in patches {
        apply_one(&mut out, op)?;
    }
    Ok(out)
}

/// Compute the inverse of a patch sequence relative to its pre-image.
///
/// `pre` must be the document the sequence applies to. The result, applied
/// to `apply(pre, patches)`, restores `pre` exactly.
///
/// # Errors
///
/// Fails when the sequence does not apply cleanly to `pre`.
pub fn invert(patches: &[PatchOp], pre: &Value) -> Result<Vec<PatchOp>, PatchError> {
    let mut working = pre.clone();
    // One undo group per forward op, flattened after reversal so the undo
    // steps within a group keep their order.
    let mut groups: Vec<Vec<PatchOp>> = Vec::with_capacity(patches.len());

    for op in patches {
        let undo = match op {
            // `add` onto an existing object member replaces it (RFC 6902
            // §4.1); the inverse must restore the old value, not remove.
            PatchOp::Add { path, .. } | PatchOp::Copy { path, .. } => {
                match existing_object_member(&working, path)? {
                    Some(old) => vec![PatchOp::Add {
                        path: path.clone(),
                        value: old,
                    }],
                    None => vec![PatchOp::Remove {
                        path: concretize(&working, path)?,
                    }],
                }
            }
            PatchOp::Remove { path } => vec![PatchOp::Add {
                path: path.clone(),
                value: resolve(&working, path)?.clone(),
            }],
            PatchOp::Replace { path, .. } => vec![PatchOp::Replace {
                path: path.clone(),
                value: resolve(&working, path)?.clone(),
            }],
            PatchOp::Move { from, path } => {
                let mut group = vec![PatchOp::Move {
                    from: concretize_after_remove(&working, from, path)?,
                    path: from.clone(),
                }];
                if let Some(old) = existing_object_member(&working, path)? {
                    // The move clobbered an object member; put it back
                    // after the moved value has returned home.
                    group.push(PatchOp::Add {
                        path: path.clone(),
                        value: old,
                    });
                }
                group
            }
            // A passing test is its own inverse.
            PatchOp::Test { path, value } => vec![PatchOp::Test {
                path: path.clone(),
                value: value.clone(),
            }],
        };
        apply_one(&mut working, op)?;
        groups.push(undo);
    }

    groups.reverse();
    Ok(groups.into_iter().flatten().collect())
}

/// If `pointer` addresses an existing member of an object (not an array
/// slot), return that member's current value.
fn existing_object_member(doc: &Value, pointer: &str) -> Result<Option<Value>, PatchError> {
    let (parent_ptr, last) = split_parent(pointer)?;
    let Ok(parent) = resolve(doc, &parent_ptr) else {
        // Let apply_one produce the error for the forward op.
        return Ok(None);
    };
    match parent {
        Value::Object(map) => Ok(map.get(&last).cloned()),
        _ => Ok(None),
    }
}

/// Replace a trailing `-` (append) token with the concrete index it lands
/// at, so the recorded inverse addresses a real element.
fn concretize(doc: &Value, pointer: &str) -> Result<String, PatchError> {
    let Some(prefix) = pointer.strip_suffix("/-") else {
        return Ok(pointer.to_string());
    };
    let len = resolve(doc, prefix)?
        .as_array()
        .map(Vec::len)
        .ok_or_else(|| PatchError::TargetNotFound {
            pointer: pointer.to_string(),
        })?;
    Ok(format!("{prefix}/{len}"))
}

/// Like [`concretize`], but for a move target, whose index is evaluated
/// after the source element has been removed.
fn concretize_after_remove(
    doc: &Value,
    from: &str,
    pointer: &str,
) -> Result<String, PatchError> {
    if !pointer.ends_with("/-") {
        return Ok(pointer.to_string());
    }
    let mut scratch = doc.clone();
    remove_at(&mut scratch, from)?;
    concretize(&scratch, pointer)
}

fn apply_one(doc: &mut Value, op: &PatchOp) -> Result<(), PatchError> {
    match op {
        PatchOp::Add { path, value } => add_at(doc, path, value.clone()),
        PatchOp::Remove { path } => remove_at(doc, path).map(|_| ()),
        PatchOp::Replace { path, value } => {
            let target = resolve_mut(doc, path)?;
            *target = value.clone();
            Ok(())
        }
        PatchOp::Move { from, path } => {
            let value = remove_at(doc, from)?;
            add_at(doc, path, value)
        }
        PatchOp::Copy { from, path } => {
            let value = resolve(doc, from)?.clone();
            add_at(doc, path, value)
        }
        PatchOp::Test { path, value } => {
            if resolve(doc, path)? == value {
                Ok(())
            } else {
                Err(PatchError::PreconditionFailed {
                    pointer: path.clone(),
                })
            }
        }
    }
}

/// Resolve a pointer to a shared reference.
fn resolve<'a>(doc: &'a Value, pointer: &str) -> Result<&'a Value, PatchError> {
    let tokens = parse_pointer(pointer)?;
    let mut current = doc;
    for token in &tokens {
        current = step(current, token).ok_or_else(|| PatchError::TargetNotFound {
            pointer: pointer.to_string(),
        })?;
    }
    Ok(current)
}

fn resolve_mut<'a>(doc: &'a mut Value, pointer: &str) -> Result<&'a mut Value, PatchError> {
    let tokens = parse_pointer(pointer)?;
    let mut current = doc;
    for token in &tokens {
        current = step_mut(current, token).ok_or_else(|| PatchError::TargetNotFound {
            pointer: pointer.to_string(),
        })?;
    }
    Ok(current)
}

fn step<'a>(value: &'a Value, token: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(token),
        Value::Array(items) => token.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

fn step_mut<'a>(value: &'a mut Value, token: &str) -> Option<&'a mut Value> {
    match value {
        Value::Object(map) => map.get_mut(token),
        Value::Array(items) => token
            .parse::<usize>()
            .ok()
            .and_then(move |i| items.get_mut(i)),
        _ => None,
    }
}

/// Split a pointer into its parent and final token.
fn split_parent(pointer: &str) -> Result<(String, String), PatchError> {
    let mut tokens = parse_pointer(pointer)?;
    let Some(last) = tokens.pop() else {
        // The whole-document pointer has no parent to insert into.
        return Err(PatchError::InvalidPointer {
            pointer: pointer.to_string(),
        });
    };
    let mut parent = String::new();
    for token in &tokens {
        parent.push('/');
        parent.push_str(&crate::patch::escape_token(token));
    }
    Ok((parent, last))
}

fn add_at(doc: &mut Value, pointer: &str, value: Value) -> Result<(), PatchError> {
    let (parent_ptr, last) = split_parent(pointer)?;
    let parent = resolve_mut(doc, &parent_ptr)?;
    match parent {
        Value::Object(map) => {
            map.insert(last, value);
            Ok(())
        }
        Value::Array(items) => {
            let index = if last == "-" {
                items.len()
            } else {
                last.parse::<usize>().map_err(|_| PatchError::InvalidPointer {
                    pointer: pointer.to_string(),
                })?
            };
            if index > items.len() {
                return Err(PatchError::TargetNotFound {
                    pointer: pointer.to_string(),
                });
            }
            items.insert(index, value);
            Ok(())
        }
        _ => Err(PatchError::TargetNotFound {
            pointer: pointer.to_string(),
        }),
    }
}

fn remove_at(doc: &mut Value, pointer: &str) -> Result<Value, PatchError> {
    let (parent_ptr, last) = split_parent(pointer)?;
    let parent = resolve_mut(doc, &parent_ptr)?;
    match parent {
        Value::Object(map) => map.remove(&last).ok_or_else(|| PatchError::TargetNotFound {
            pointer: pointer.to_string(),
        }),
        Value::Array(items) => {
            let index = last
                .parse::<usize>()
                .ok()
                .filter(|&i| i < items.len())
                .ok_or_else(|| PatchError::TargetNotFound {
                    pointer: pointer.to_string(),
                })?;
            Ok(items.remove(index))
        }
        _ => Err(PatchError::TargetNotFound {
            pointer: pointer.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn doc() -> Value {
        json!({
            "name": "doc",
            "items": [ { "v": 1 }, { "v": 2 }, { "v": 3 } ]
        })
    }

    #[test]
    fn test_add_to_object_and_array() {
        let out = apply(
            &doc(),
            &[
                PatchOp::Add {
                    path: "/tag".to_string(),
                    value: json!("x"),
                },
                PatchOp::Add {
                    path: "/items/1".to_string(),
                    value: json!({ "v": 99 }),
                },
                PatchOp::Add {
                    path: "/items/-".to_string(),
                    value: json!({ "v": 4 }),
                },
            ],
        )
        .unwrap();
        assert_eq!(out["tag"], "x");
        assert_eq!(out["items"][1]["v"], 99);
        assert_eq!(out["items"][4]["v"], 4);
    }

    #[test]
    fn test_remove_and_replace() {
        let out = apply(
            &doc(),
            &[
                PatchOp::Remove {
                    path: "/items/0".to_string(),
                },
                PatchOp::Replace {
                    path: "/name".to_string(),
                    value: json!("renamed"),
                },
            ],
        )
        .unwrap();
        assert_eq!(out["items"][0]["v"], 2);
        assert_eq!(out["name"], "renamed");
    }

    #[test]
    fn test_move_within_array() {
        let out = apply(
            &doc(),
            &[PatchOp::Move {
                from: "/items/0".to_string(),
                path: "/items/2".to_string(),
            }],
        )
        .unwrap();
        let vs: Vec<i64> = out["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|item| item["v"].as_i64().unwrap())
            .collect();
        assert_eq!(vs, [2, 3, 1]);
    }

    #[test]
    fn test_copy() {
        let out = apply(
            &doc(),
            &[PatchOp::Copy {
                from: "/items/0".to_string(),
                path: "/items/-".to_string(),
            }],
        )
        .unwrap();
        assert_eq!(out["items"].as_array().unwrap().len(), 4);
        assert_eq!(out["items"][3], out["items"][0]);
    }

    #[test]
    fn test_failed_test_rejects_sequence() {
        let err = apply(
            &doc(),
            &[
                PatchOp::Test {
                    path: "/name".to_string(),
                    value: json!("wrong"),
                },
                PatchOp::Remove {
                    path: "/items/0".to_string(),
                },
            ],
        )
        .unwrap_err();
        assert!(matches!(err, PatchError::PreconditionFailed { .. }));
    }

    #[test]
    fn test_missing_target_rejected() {
        assert!(matches!(
            apply(&doc(), &[PatchOp::Remove { path: "/nope".to_string() }]),
            Err(PatchError::TargetNotFound { .. })
        ));
        assert!(matches!(
            apply(
                &doc(),
                &[PatchOp::Add { path: "/items/9".to_string(), value: json!(1) }]
            ),
            Err(PatchError::TargetNotFound { .. })
        ));
    }

    #[test]
    fn test_input_untouched_on_error() {
        let original = doc();
        let _ = apply(
            &original,
            &[
                PatchOp::Remove {
                    path: "/items/0".to_string(),
                },
                PatchOp::Remove {
                    path: "/missing".to_string(),
                },
            ],
        );
        assert_eq!(original, doc());
    }

    #[test]
    fn test_invert_restores_exactly() {
        let patches = vec![
            PatchOp::Replace {
                path: "/name".to_string(),
                value: json!("changed"),
            },
            PatchOp::Remove {
                path: "/items/1".to_string(),
            },
            PatchOp::Add {
                path: "/items/-".to_string(),
                value: json!({ "v": 7 }),
            },
            PatchOp::Move {
                from: "/items/0".to_string(),
                path: "/items/1".to_string(),
            },
        ];
        let pre = doc();
        let inverse = invert(&patches, &pre).unwrap();
        let post = apply(&pre, &patches).unwrap();
        let restored = apply(&post, &inverse).unwrap();
        assert_eq!(restored, pre);
    }

    #[test]
    fn test_invert_restores_clobbered_object_member() {
        // `add` over an existing key replaces it; the inverse must bring
        // the old value back.
        let patches = vec![PatchOp::Add {
            path: "/name".to_string(),
            value: json!("clobbered"),
        }];
        let pre = doc();
        let inverse = invert(&patches, &pre).unwrap();
        let post = apply(&pre, &patches).unwrap();
        assert_eq!(post["name"], "clobbered");
        let restored = apply(&post, &inverse).unwrap();
        assert_eq!(restored, pre);
    }

    #[test]
    fn test_invert_concretizes_append() {
        let patches = vec![PatchOp::Add {
            path: "/items/-".to_string(),
            value: json!({ "v": 4 }),
        }];
        let inverse = invert(&patches, &doc()).unwrap();
        assert_eq!(
            inverse,
            vec![PatchOp::Remove {
                path: "/items/3".to_string()
            }]
        );
    }

    proptest! {
        /// Random add/remove/replace sequences over a small tree always
        /// round-trip through their inverse.
        #[test]
        fn prop_apply_invert_roundtrip(ops in arb_ops()) {
            let pre = doc();
            // Filter to sequences that apply cleanly.
            if let Ok(inverse) = invert(&ops, &pre) {
                let post = apply(&pre, &ops).unwrap();
                let restored = apply(&post, &inverse).unwrap();
                prop_assert_eq!(restored, pre);
            }
        }
    }

    fn arb_ops() -> impl Strategy<Value = Vec<PatchOp>> {
        let pointer = prop_oneof![
            Just("/name".to_string()),
            Just("/items/0".to_string()),
            Just("/items/1".to_string()),
            Just("/items/2".to_string()),
            Just("/items/-".to_string()),
            Just("/tag".to_string()),
        ];
        let op = (pointer, 0i64..100).prop_flat_map(|(path, n)| {
            prop_oneof![
                Just(PatchOp::Add {
                    path: path.clone(),
                    value: json!(n),
                }),
                Just(PatchOp::Replace {
                    path: path.clone(),
                    value: json!(n),
                }),
                Just(PatchOp::Remove { path }),
            ]
        });
        prop::collection::vec(op, 1..6)
    }
}
