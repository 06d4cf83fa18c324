//! # Field-level Merge
//!
//! Generic three-way merge over JSON values, used for everything about a
//! node except its identity and its child sequence.
//!
//! The rules, applied at every level:
//!
//! 1. Both sides agree → take the shared value.
//! 2. Exactly one side changed relative to base → take the changed side.
//! 3. Both changed divergently:
//!    - two objects merge **key-wise** (this is what makes `data` bags,
//!      component props, styles, and frame records merge per field);
//!    - anything else, scalars and arrays alike, is treated **wholesale**:
//!      a `P-001` conflict is recorded and the preferred side's value wins.
//!
//! Arrays being wholesale is deliberate: fill and stroke sequences are
//! painting instructions whose order carries meaning, and element-wise
//! merging of divergent paint stacks produces nonsense nobody asked for.

use crate::conflict::{Conflict, ConflictCode, ConflictSink};
use easel_schema::NodeId;
use serde_json::{Map, Value};

/// Three-way merge of an optional field value. `None` means the field is
/// absent on that side; a `None` result means the field is absent in the
/// merged output.
#[allow(clippy::too_many_arguments)]
pub(crate) fn merge_value(
    base: Option<&Value>,
    local: Option<&Value>,
    remote: Option<&Value>,
    id: Option<NodeId>,
    pointer: &str,
    field: &str,
    prefer_local: bool,
    sink: &mut ConflictSink,
) -> Option<Value> {
    if local == remote {
        return local.cloned();
    }
    if local == base {
        return remote.cloned();
    }
    if remote == base {
        return local.cloned();
    }

    // Both sides changed, differently. Objects merge key-wise; everything
    // else conflicts wholesale.
    if let (Some(Value::Object(local_map)), Some(Value::Object(remote_map))) = (local, remote) {
        let base_map = match base {
            Some(Value::Object(map)) => Some(map),
            _ => None,
        };
        return Some(Value::Object(merge_objects(
            base_map,
            local_map,
            remote_map,
            id,
            pointer,
            field,
            prefer_local,
            sink,
        )));
    }

    sink.push(Conflict {
        code: ConflictCode::DivergentProperty,
        id,
        pointer: pointer.to_string(),
        field: Some(field.to_string()).filter(|f| !f.is_empty()),
        base: base.cloned(),
        local: local.cloned(),
        remote: remote.cloned(),
        message: format!(
            "both sides changed \"{}\" to different values",
            if field.is_empty() { "node" } else { field }
        ),
    });
    if prefer_local {
        local.cloned()
    } else {
        remote.cloned()
    }
}

/// Key-wise merge of two divergent objects against an optional base.
#[allow(clippy::too_many_arguments)]
fn merge_objects(
    base: Option<&Map<String, Value>>,
    local: &Map<String, Value>,
    remote: &Map<String, Value>,
    id: Option<NodeId>,
    pointer: &str,
    field: &str,
    prefer_local: bool,
    sink: &mut ConflictSink,
) -> Map<String, Value> {
    let mut keys: Vec<&String> = local.keys().chain(remote.keys()).collect();
    if let Some(base_map) = base {
        keys.extend(base_map.keys());
    }
    keys.sort_unstable();
    keys.dedup();

    let mut out = Map::new();
    for key in keys {
        let child_field = if field.is_empty() {
            key.clone()
        } else {
            format!("{field}.{key}")
        };
        let merged = merge_value(
            base.and_then(|m| m.get(key.as_str())),
            local.get(key.as_str()),
            remote.get(key.as_str()),
            id,
            pointer,
            &child_field,
            prefer_local,
            sink,
        );
        if let Some(value) = merged {
            out.insert(key.clone(), value);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(
        base: Option<Value>,
        local: Option<Value>,
        remote: Option<Value>,
        prefer_local: bool,
    ) -> (Option<Value>, Vec<Conflict>) {
        let mut sink = ConflictSink::default();
        let merged = merge_value(
            base.as_ref(),
            local.as_ref(),
            remote.as_ref(),
            None,
            "/artboards/0/children/0",
            "name",
            prefer_local,
            &mut sink,
        );
        (merged, sink.into_parts().0)
    }

    #[test]
    fn test_unchanged() {
        let (merged, conflicts) = run(
            Some(json!("a")),
            Some(json!("a")),
            Some(json!("a")),
            true,
        );
        assert_eq!(merged, Some(json!("a")));
        assert!(conflicts.is_empty());
    }

    #[test]
    fn test_one_sided_change_taken() {
        let (merged, conflicts) = run(
            Some(json!("a")),
            Some(json!("b")),
            Some(json!("a")),
            true,
        );
        assert_eq!(merged, Some(json!("b")));
        assert!(conflicts.is_empty());

        let (merged, conflicts) = run(
            Some(json!("a")),
            Some(json!("a")),
            Some(json!("c")),
            true,
        );
        assert_eq!(merged, Some(json!("c")));
        assert!(conflicts.is_empty());
    }

    #[test]
    fn test_identical_change_taken_once() {
        let (merged, conflicts) = run(
            Some(json!("a")),
            Some(json!("b")),
            Some(json!("b")),
            true,
        );
        assert_eq!(merged, Some(json!("b")));
        assert!(conflicts.is_empty());
    }

    #[test]
    fn test_divergent_scalar_conflicts_prefer_local() {
        let (merged, conflicts) = run(
            Some(json!("a")),
            Some(json!("b")),
            Some(json!("c")),
            true,
        );
        assert_eq!(merged, Some(json!("b")));
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].code, ConflictCode::DivergentProperty);
        assert_eq!(conflicts[0].field.as_deref(), Some("name"));
        assert_eq!(conflicts[0].base, Some(json!("a")));
        assert_eq!(conflicts[0].local, Some(json!("b")));
        assert_eq!(conflicts[0].remote, Some(json!("c")));
    }

    #[test]
    fn test_divergent_scalar_prefer_remote() {
        let (merged, conflicts) = run(
            Some(json!("a")),
            Some(json!("b")),
            Some(json!("c")),
            false,
        );
        assert_eq!(merged, Some(json!("c")));
        assert_eq!(conflicts.len(), 1);
    }

    #[test]
    fn test_one_sided_removal() {
        let (merged, conflicts) = run(Some(json!("a")), None, Some(json!("a")), true);
        assert_eq!(merged, None);
        assert!(conflicts.is_empty());
    }

    #[test]
    fn test_divergent_arrays_conflict_wholesale() {
        let (merged, conflicts) = run(
            Some(json!([1, 2])),
            Some(json!([2, 1])),
            Some(json!([1, 2, 3])),
            true,
        );
        assert_eq!(merged, Some(json!([2, 1])));
        assert_eq!(conflicts.len(), 1);
    }

    #[test]
    fn test_divergent_objects_merge_keywise() {
        let (merged, conflicts) = run(
            Some(json!({ "a": 1, "b": 1 })),
            Some(json!({ "a": 2, "b": 1 })),
            Some(json!({ "a": 1, "b": 2 })),
            true,
        );
        // Disjoint edits combine without conflict.
        assert_eq!(merged, Some(json!({ "a": 2, "b": 2 })));
        assert!(conflicts.is_empty());
    }

    #[test]
    fn test_keywise_merge_reports_nested_field() {
        let (merged, conflicts) = run(
            Some(json!({ "a": 1 })),
            Some(json!({ "a": 2 })),
            Some(json!({ "a": 3 })),
            true,
        );
        assert_eq!(merged, Some(json!({ "a": 2 })));
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].field.as_deref(), Some("name.a"));
    }

    #[test]
    fn test_keywise_merge_with_added_keys() {
        let (merged, conflicts) = run(
            Some(json!({})),
            Some(json!({ "x": 1 })),
            Some(json!({ "y": 2 })),
            true,
        );
        assert_eq!(merged, Some(json!({ "x": 1, "y": 2 })));
        assert!(conflicts.is_empty());
    }
}
