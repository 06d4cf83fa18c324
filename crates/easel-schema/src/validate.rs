//! # Structural Validation and Repair
//!
//! The validator checks every constraint the type system cannot carry:
//! version literals, value ranges, identifier and semantic-key uniqueness.
//! It collects *all* violations with JSON-Pointer addresses instead of
//! failing at the first one, so a hosting tool can show the complete list.
//! Validation never mutates its input.
//!
//! **Repair** is the bounded counterpart for documents that claim the
//! current schema version but were written by sloppier producers: it fills
//! safe defaults (missing `frame`, missing `children`, missing document
//! `id`/`name`) and nothing else. Repair never invents identifiers for
//! existing nodes, never changes a node's type, and never removes fields.

use crate::error::{SchemaError, Violation};
use crate::ident::NodeId;
use crate::model::{Document, Fill, Node, Style, CURRENT_SCHEMA_VERSION};
use serde_json::{json, Value};
use std::collections::HashMap;

/// Repair recursion bound; anything deeper fails validation on depth-related
/// grounds long before repair matters.
const MAX_REPAIR_DEPTH: usize = 64;

/// Validate a document, returning `Ok(())` or every violation at once.
///
/// # Errors
///
/// [`SchemaError::Invalid`] carrying the full violation list.
pub fn validate(doc: &Document) -> Result<(), SchemaError> {
    let violations = validate_collect(doc);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(SchemaError::Invalid { violations })
    }
}

/// Collect all violations without constructing an error.
#[must_use]
pub fn validate_collect(doc: &Document) -> Vec<Violation> {
    let mut out = Vec::new();

    if doc.schema_version != CURRENT_SCHEMA_VERSION {
        out.push(violation(
            "/schemaVersion",
            format!(
                "expected schema version \"{CURRENT_SCHEMA_VERSION}\", got \"{}\"",
                doc.schema_version
            ),
        ));
    }

    if doc.artboards.is_empty() {
        out.push(violation("/artboards", "document must contain at least one artboard"));
    }

    // Identifier and semantic-key uniqueness are document-wide.
    let mut seen_ids: HashMap<NodeId, String> = HashMap::new();
    let mut seen_keys: HashMap<String, String> = HashMap::new();
    seen_ids.insert(doc.id, String::new());

    for (ab_index, artboard) in doc.artboards.iter().enumerate() {
        let ab_pointer = format!("/artboards/{ab_index}");

        if let Some(first) = seen_ids.insert(artboard.id, ab_pointer.clone()) {
            out.push(violation(
                format!("{ab_pointer}/id"),
                format!("duplicate identifier \"{}\" (first seen at \"{first}\")", artboard.id),
            ));
        }
        check_rect(&mut out, &format!("{ab_pointer}/frame"), artboard.frame);
        if let Some(background) = &artboard.background {
            check_fill(&mut out, &format!("{ab_pointer}/background"), background);
        }

        // Explicit stack; adversarial nesting must not overflow ours.
        let mut stack: Vec<(&Node, String)> = Vec::new();
        for (i, child) in artboard.children.iter().enumerate().rev() {
            stack.push((child, format!("{ab_pointer}/children/{i}")));
        }
        while let Some((node, pointer)) = stack.pop() {
            check_node(&mut out, node, &pointer, &mut seen_ids, &mut seen_keys);
            if let Some(children) = node.children() {
                for (i, child) in children.iter().enumerate().rev() {
                    stack.push((child, format!("{pointer}/children/{i}")));
                }
            }
        }
    }

    out
}

fn check_node(
    out: &mut Vec<Violation>,
    node: &Node,
    pointer: &str,
    seen_ids: &mut HashMap<NodeId, String>,
    seen_keys: &mut HashMap<String, String>,
) {
    if let Some(first) = seen_ids.insert(node.id, pointer.to_string()) {
        out.push(violation(
            format!("{pointer}/id"),
            format!("duplicate identifier \"{}\" (first seen at \"{first}\")", node.id),
        ));
    }

    check_rect(out, &format!("{pointer}/frame"), node.frame);

    if let Some(style) = &node.style {
        check_style(out, &format!("{pointer}/style"), style);
    }

    if let Some(key) = &node.semantic_key {
        if !is_valid_semantic_key(key) {
            out.push(violation(
                format!("{pointer}/semanticKey"),
                format!("semantic key \"{key}\" is not a dotted lowercase path"),
            ));
        } else if let Some(first) = seen_keys.insert(key.clone(), pointer.to_string()) {
            out.push(violation(
                format!("{pointer}/semanticKey"),
                format!("duplicate semantic key \"{key}\" (first seen at \"{first}\")"),
            ));
        }
    }
}

fn check_rect(out: &mut Vec<Violation>, pointer: &str, rect: crate::model::Rect) {
    if !rect.width.is_finite() || rect.width < 0.0 {
        out.push(violation(
            format!("{pointer}/width"),
            format!("width must be a non-negative finite number, got {}", rect.width),
        ));
    }
    if !rect.height.is_finite() || rect.height < 0.0 {
        out.push(violation(
            format!("{pointer}/height"),
            format!("height must be a non-negative finite number, got {}", rect.height),
        ));
    }
    if !rect.x.is_finite() {
        out.push(violation(format!("{pointer}/x"), "x must be finite"));
    }
    if !rect.y.is_finite() {
        out.push(violation(format!("{pointer}/y"), "y must be finite"));
    }
}

fn check_style(out: &mut Vec<Violation>, pointer: &str, style: &Style) {
    for (i, fill) in style.fills.iter().enumerate() {
        check_fill(out, &format!("{pointer}/fills/{i}"), fill);
    }
    for (i, stroke) in style.strokes.iter().enumerate() {
        if !stroke.width.is_finite() || stroke.width < 0.0 {
            out.push(violation(
                format!("{pointer}/strokes/{i}/width"),
                format!("stroke width must be non-negative, got {}", stroke.width),
            ));
        }
        if let Some(opacity) = stroke.opacity {
            check_unit_interval(out, &format!("{pointer}/strokes/{i}/opacity"), opacity);
        }
    }
    if let Some(radius) = style.corner_radius {
        if !radius.is_finite() || radius < 0.0 {
            out.push(violation(
                format!("{pointer}/cornerRadius"),
                format!("corner radius must be non-negative, got {radius}"),
            ));
        }
    }
    if let Some(opacity) = style.opacity {
        check_unit_interval(out, &format!("{pointer}/opacity"), opacity);
    }
}

fn check_fill(out: &mut Vec<Violation>, pointer: &str, fill: &Fill) {
    if let Some(opacity) = fill.opacity {
        check_unit_interval(out, &format!("{pointer}/opacity"), opacity);
    }
    for (i, stop) in fill.stops.iter().enumerate() {
        if !(0.0..=1.0).contains(&stop.offset) || !stop.offset.is_finite() {
            out.push(violation(
                format!("{pointer}/stops/{i}/offset"),
                format!("color stop offset must lie in [0, 1], got {}", stop.offset),
            ));
        }
    }
}

fn check_unit_interval(out: &mut Vec<Violation>, pointer: &str, value: f64) {
    if !(0.0..=1.0).contains(&value) || !value.is_finite() {
        out.push(violation(
            pointer.to_string(),
            format!("value must lie in [0, 1], got {value}"),
        ));
    }
}

fn violation(pointer: impl Into<String>, message: impl Into<String>) -> Violation {
    Violation {
        pointer: pointer.into(),
        message: message.into(),
    }
}

/// Semantic keys are dotted lowercase paths: segments of `[a-z0-9_]`, each
/// optionally followed by a numeric index like `items[0]`.
#[must_use]
pub(crate) fn is_valid_semantic_key(key: &str) -> bool {
    if key.is_empty() {
        return false;
    }
    key.split('.').all(|segment| {
        let (name, index) = match segment.find('[') {
            Some(pos) => {
                let (name, rest) = segment.split_at(pos);
                match rest.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
                    Some(digits) => (name, Some(digits)),
                    None => return false,
                }
            }
            None => (segment, None),
        };
        let name_ok = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
        let index_ok = match index {
            Some(digits) => !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()),
            None => true,
        };
        name_ok && index_ok
    })
}

/// Fill safe defaults on a raw document value claiming the current schema
/// version, returning the repaired value. The caller re-parses and
/// re-validates; repair itself makes no promises beyond the listed defaults.
#[must_use]
pub fn repair(value: &Value) -> Value {
    let mut repaired = value.clone();
    let Some(doc) = repaired.as_object_mut() else {
        return repaired;
    };
    if doc.get("schemaVersion").and_then(Value::as_str) != Some(CURRENT_SCHEMA_VERSION) {
        // Wrong or missing version is migration's job, not repair's.
        return repaired;
    }

    if !doc.contains_key("id") {
        doc.insert("id".to_string(), json!(NodeId::generate().to_string()));
    }
    if !doc.contains_key("name") {
        doc.insert("name".to_string(), json!("Untitled"));
    }

    if let Some(artboards) = doc.get_mut("artboards").and_then(Value::as_array_mut) {
        for artboard in artboards {
            if let Some(ab) = artboard.as_object_mut() {
                ab.entry("children").or_insert_with(|| json!([]));
                ab.entry("frame").or_insert_with(zero_rect);
                if let Some(children) = ab.get_mut("children") {
                    repair_nodes(children, 0);
                }
            }
        }
    }

    repaired
}

fn repair_nodes(children: &mut Value, depth: usize) {
    if depth > MAX_REPAIR_DEPTH {
        return;
    }
    let Some(items) = children.as_array_mut() else {
        return;
    };
    for item in items {
        let Some(node) = item.as_object_mut() else {
            continue;
        };
        node.entry("frame").or_insert_with(zero_rect);
        match node.get("type").and_then(Value::as_str) {
            Some("frame") => {
                node.entry("children").or_insert_with(|| json!([]));
                if let Some(grandchildren) = node.get_mut("children") {
                    repair_nodes(grandchildren, depth + 1);
                }
            }
            Some("component") => {
                node.entry("props").or_insert_with(|| json!({}));
            }
            _ => {}
        }
    }
}

fn zero_rect() -> Value {
    json!({ "x": 0.0, "y": 0.0, "width": 0.0, "height": 0.0 })
}
