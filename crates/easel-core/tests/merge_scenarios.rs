//! # Merge Scenario Suite
//!
//! The seed scenarios every conforming implementation of the merge engine
//! must reproduce, end to end through the facade:
//!
//! | Scenario | Test |
//! |----------|------|
//! | Single property change | `test_scenario_single_property_change` |
//! | Both-sided divergent property | `test_scenario_divergent_property` |
//! | Edit vs delete | `test_scenario_edit_vs_delete` |
//! | Compatible vs conflicting reorder | `test_scenario_structural_reorder` |
//! | Duplicate subtree | `test_scenario_duplicate_subtree` |
//! | Legacy migration | `test_scenario_migration_allocates_document_id` |

use easel_core::{ConflictCode, Engine, MergeOptions};
use easel_ops::apply;
use easel_schema::{Document, Fill, Node, NodeBody, NodeId, Rect, Style};
use serde_json::json;

fn engine() -> Engine {
    Engine::default()
}

/// Base: one artboard holding a frame with fill `#111`.
fn one_frame_doc() -> Document {
    let mut doc = Document::new("Scenarios");
    let mut frame = Node::frame("Card", Rect::new(0.0, 0.0, 200.0, 100.0));
    frame.style = Some(Style {
        fills: vec![Fill::solid("#111")],
        ..Style::default()
    });
    frame.semantic_key = Some("card.root".to_string());
    doc.artboards[0].children.push(frame);
    doc
}

fn with_fill(doc: &Document, color: &str) -> Document {
    let mut out = doc.clone();
    out.artboards[0].children[0].style = Some(Style {
        fills: vec![Fill::solid(color)],
        ..Style::default()
    });
    out
}

fn fill_of(doc: &Document) -> String {
    doc.artboards[0].children[0]
        .style
        .as_ref()
        .unwrap()
        .fills[0]
        .color
        .clone()
        .unwrap()
}

#[test]
fn test_scenario_single_property_change() {
    let base = one_frame_doc();
    let local = with_fill(&base, "#222");
    let remote = base.clone();

    let outcome = engine().merge(&base, &local, &remote, None).unwrap();
    assert_eq!(fill_of(&outcome.merged), "#222");
    assert!(outcome.conflicts.is_empty());
}

#[test]
fn test_scenario_divergent_property() {
    let base = one_frame_doc();
    let local = with_fill(&base, "#222");
    let remote = with_fill(&base, "#333");

    let outcome = engine().merge(&base, &local, &remote, None).unwrap();
    assert_eq!(outcome.conflicts.len(), 1);
    assert_eq!(outcome.conflicts[0].code, ConflictCode::DivergentProperty);
    assert_eq!(outcome.conflicts[0].code.as_str(), "P-001");
    // Local is preferred.
    assert_eq!(fill_of(&outcome.merged), "#222");
}

#[test]
fn test_scenario_edit_vs_delete() {
    // Base: frame with a text child "hello".
    let mut base = one_frame_doc();
    let mut text = Node::text("Greeting", Rect::new(5.0, 5.0, 100.0, 20.0), "hello");
    text.semantic_key = Some("card.greeting".to_string());
    base.artboards[0].children[0]
        .children_mut()
        .unwrap()
        .push(text);

    // Local edits the text; remote deletes the child.
    let mut local = base.clone();
    if let NodeBody::Text { text, .. } =
        &mut local.artboards[0].children[0].children_mut().unwrap()[0].body
    {
        *text = "world".to_string();
    }
    let mut remote = base.clone();
    remote.artboards[0].children[0]
        .children_mut()
        .unwrap()
        .clear();

    let outcome = engine().merge(&base, &local, &remote, None).unwrap();
    assert_eq!(outcome.conflicts.len(), 1);
    assert_eq!(outcome.conflicts[0].code.as_str(), "S-001");

    // The merged document retains the local edit.
    let children = outcome.merged.artboards[0].children[0].children().unwrap();
    assert_eq!(children.len(), 1);
    match &children[0].body {
        NodeBody::Text { text, .. } => assert_eq!(text, "world"),
        other => panic!("expected text node, got {other:?}"),
    }
}

#[test]
fn test_scenario_structural_reorder() {
    // Base: frame with children [A, B, C].
    let mut base = one_frame_doc();
    for name in ["A", "B", "C"] {
        let mut child = Node::frame(name, Rect::new(0.0, 0.0, 10.0, 10.0));
        child.semantic_key = Some(format!("card.slot_{}", name.to_lowercase()));
        base.artboards[0].children[0]
            .children_mut()
            .unwrap()
            .push(child);
    }
    let reorder = |doc: &Document, order: [usize; 3]| -> Document {
        let mut out = doc.clone();
        let children = std::mem::take(out.artboards[0].children[0].children_mut().unwrap());
        let mut slots: Vec<Option<Node>> = children.into_iter().map(Some).collect();
        *out.artboards[0].children[0].children_mut().unwrap() =
            order.iter().map(|&i| slots[i].take().unwrap()).collect();
        out
    };

    // Local: [B, A, C]; remote: [A, C, B].
    let local = reorder(&base, [1, 0, 2]);
    let remote = reorder(&base, [0, 2, 1]);

    let outcome = engine().merge(&base, &local, &remote, None).unwrap();
    assert_eq!(outcome.conflicts.len(), 1);
    assert_eq!(outcome.conflicts[0].code.as_str(), "S-002");

    // Merged order is local's.
    let names: Vec<_> = outcome.merged.artboards[0].children[0]
        .children()
        .unwrap()
        .iter()
        .map(|n| n.name.clone())
        .collect();
    assert_eq!(names, ["B", "A", "C"]);
}

#[test]
fn test_scenario_duplicate_subtree() {
    let engine = engine();
    let mut doc = one_frame_doc();
    doc.artboards[0].children[0]
        .children_mut()
        .unwrap()
        .push(Node::text("Label", Rect::new(0.0, 0.0, 50.0, 20.0), "t"));
    let source_id = doc.artboards[0].children[0].id;
    let pre_canonical = engine.serialize(&doc).unwrap();

    let outcome = engine.duplicate(&doc, source_id).unwrap();
    let children = &outcome.document.artboards[0].children;
    assert_eq!(children.len(), 2);

    // The copy sits immediately after the source.
    assert_eq!(children[0].id, source_id);
    let copy = &children[1];
    assert_eq!(copy.name, "Card Copy");

    // Fresh identifiers throughout; no semantic keys copied.
    let mut ids = std::collections::HashSet::new();
    for visit in easel_tree::walk(&outcome.document, easel_tree::WalkConfig::default()) {
        assert!(ids.insert(visit.node.id));
    }
    assert!(copy.semantic_key.is_none());
    assert!(copy.children().unwrap()[0].id != children[0].children().unwrap()[0].id);

    // Applying the inverse patches restores the pre-duplicate canonical
    // bytes exactly.
    let post = serde_json::to_value(&outcome.document).unwrap();
    let restored = apply(&post, &outcome.inverse).unwrap();
    let restored_doc: easel_schema::Document = serde_json::from_value(restored).unwrap();
    assert_eq!(engine.serialize(&restored_doc).unwrap(), pre_canonical);
}

#[test]
fn test_scenario_migration_allocates_document_id() {
    let engine = engine();
    let legacy = json!({
        "schemaVersion": "0.0.1",
        "frames": [
            {
                "id": NodeId::generate().to_string(),
                "name": "First",
                "frame": { "x": 0.0, "y": 0.0, "width": 640.0, "height": 480.0 },
                "children": []
            },
            {
                "id": NodeId::generate().to_string(),
                "name": "Second",
                "frame": { "x": 0.0, "y": 0.0, "width": 640.0, "height": 480.0 },
                "children": []
            }
        ]
    });

    let migrated = engine.migrate(&legacy).unwrap();
    assert_eq!(migrated.schema_version, easel_core::CURRENT_SCHEMA_VERSION);
    // A fresh document id was allocated and validation passes.
    assert!(easel_schema::validate(&migrated).is_ok());
    // Artboard order is preserved.
    let names: Vec<_> = migrated.artboards.iter().map(|ab| ab.name.clone()).collect();
    assert_eq!(names, ["First", "Second"]);
    // The original input is unmodified.
    assert!(legacy.get("artboards").is_none());
}

// =============================================================================
// UNIVERSAL MERGE PROPERTIES THROUGH THE FACADE
// =============================================================================

#[test]
fn test_merge_idempotence() {
    let base = one_frame_doc();
    let branch = with_fill(&base, "#abc");

    let outcome = engine().merge(&base, &branch, &branch, None).unwrap();
    assert!(outcome.conflicts.is_empty());
    assert_eq!(
        engine().serialize(&outcome.merged).unwrap(),
        engine().serialize(&branch).unwrap()
    );
}

#[test]
fn test_merge_determinism_across_calls() {
    let base = one_frame_doc();
    let local = with_fill(&base, "#222");
    let remote = with_fill(&base, "#333");

    let engine = engine();
    let first = engine.merge(&base, &local, &remote, None).unwrap();
    let second = engine.merge(&base, &local, &remote, None).unwrap();
    assert_eq!(
        engine.serialize(&first.merged).unwrap(),
        engine.serialize(&second.merged).unwrap()
    );
    assert_eq!(first.conflicts, second.conflicts);
}

#[test]
fn test_merge_patches_reach_merged_document() {
    let base = one_frame_doc();
    let local = with_fill(&base, "#222");
    let mut remote = base.clone();
    remote.artboards[0]
        .children
        .push(Node::frame("New", Rect::new(0.0, 0.0, 10.0, 10.0)));

    let outcome = engine().merge(&base, &local, &remote, None).unwrap();
    let patched = apply(
        &serde_json::to_value(&base).unwrap(),
        &outcome.patches_from_base,
    )
    .unwrap();
    assert_eq!(patched, serde_json::to_value(&outcome.merged).unwrap());
}

#[test]
fn test_merge_with_prefer_remote_option() {
    let base = one_frame_doc();
    let local = with_fill(&base, "#222");
    let remote = with_fill(&base, "#333");

    let options = MergeOptions {
        resolution: easel_core::Resolution::PreferRemote,
        ..MergeOptions::default()
    };
    let outcome = engine().merge(&base, &local, &remote, Some(options)).unwrap();
    assert_eq!(fill_of(&outcome.merged), "#333");
    assert_eq!(outcome.conflicts.len(), 1);
}
