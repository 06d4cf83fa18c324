//! # Node Operations
//!
//! The five document mutations: create, update, delete, move, duplicate.
//! Each validates its inputs against the *current* document, computes a
//! JSON-Patch sequence describing the change, and derives the new document
//! by applying that sequence, so the returned patches are the authoritative
//! description of what happened, and the inverse patches restore the prior
//! document exactly.
//!
//! Operations never mutate their input. On any error the input document is
//! untouched and no partial state escapes.

use crate::apply::{apply, invert};
use crate::error::OpError;
use crate::patch::{escape_token, parse_pointer, PatchOp};
use easel_schema::{
    validate_collect, Document, LayoutHints, Node, NodeBody, NodeId, NodeKind, Rect, Style,
    TextStyle,
};
use easel_tree::{find_path_by_id, find_by_semantic_key, NodePath};
use serde_json::{Map, Value};

/// The result of a successful operation.
#[derive(Debug, Clone)]
pub struct OpOutcome {
    /// The new document value.
    pub document: Document,

    /// Forward patches; applying them to the input document yields
    /// `document`.
    pub patches: Vec<PatchOp>,

    /// Inverse patches; applying them to `document` restores the input.
    pub inverse: Vec<PatchOp>,
}

/// Specification of a node to create. Unset fields take kind-appropriate
/// defaults (`visible: true`, zero frame, empty children/props).
#[derive(Debug, Clone)]
pub struct NewNode {
    pub kind: NodeKind,
    pub name: Option<String>,
    pub frame: Option<Rect>,
    pub visible: Option<bool>,
    pub style: Option<Style>,
    pub data: Option<Map<String, Value>>,
    pub bind: Option<String>,
    pub semantic_key: Option<String>,

    /// Text content; text nodes only.
    pub text: Option<String>,
    /// Text styling; text nodes only.
    pub text_style: Option<TextStyle>,

    /// Component library key; required for component nodes.
    pub component_key: Option<String>,
    /// Property overrides; component nodes only.
    pub props: Option<Map<String, Value>>,

    /// Layout hints; frame nodes only.
    pub layout: Option<LayoutHints>,
}

impl NewNode {
    /// An empty frame specification.
    #[must_use]
    pub fn frame() -> Self {
        Self::of_kind(NodeKind::Frame)
    }

    /// A text node specification with the given content.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            text: Some(content.into()),
            ..Self::of_kind(NodeKind::Text)
        }
    }

    /// A component instance specification with the given library key.
    #[must_use]
    pub fn component(key: impl Into<String>) -> Self {
        Self {
            component_key: Some(key.into()),
            ..Self::of_kind(NodeKind::Component)
        }
    }

    /// Set the node name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the node frame.
    #[must_use]
    pub fn with_frame(mut self, frame: Rect) -> Self {
        self.frame = Some(frame);
        self
    }

    /// Set the semantic key.
    #[must_use]
    pub fn with_semantic_key(mut self, key: impl Into<String>) -> Self {
        self.semantic_key = Some(key.into());
        self
    }

    /// Set the style.
    #[must_use]
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = Some(style);
        self
    }

    fn of_kind(kind: NodeKind) -> Self {
        Self {
            kind,
            name: None,
            frame: None,
            visible: None,
            style: None,
            data: None,
            bind: None,
            semantic_key: None,
            text: None,
            text_style: None,
            component_key: None,
            props: None,
            layout: None,
        }
    }

    /// Materialize the specification into a node with a fresh identifier.
    fn build(self) -> Result<Node, OpError> {
        let body = match self.kind {
            NodeKind::Frame => NodeBody::Frame {
                layout: self.layout,
                children: Vec::new(),
            },
            NodeKind::Text => NodeBody::Text {
                text: self.text.unwrap_or_default(),
                text_style: self.text_style,
            },
            NodeKind::Component => NodeBody::Component {
                component_key: self.component_key.ok_or_else(|| OpError::InvalidNode {
                    message: "component nodes require a componentKey".to_string(),
                })?,
                props: self.props.unwrap_or_default(),
            },
        };

        let frame = self.frame.unwrap_or_default();
        if frame.width < 0.0 || frame.height < 0.0 {
            return Err(OpError::InvalidNode {
                message: format!(
                    "frame dimensions must be non-negative, got {}x{}",
                    frame.width, frame.height
                ),
            });
        }

        Ok(Node {
            id: NodeId::generate(),
            name: self.name.unwrap_or_else(|| default_name(self.kind)),
            visible: self.visible.unwrap_or(true),
            frame,
            style: self.style,
            data: self.data,
            bind: self.bind,
            semantic_key: self.semantic_key,
            body,
        })
    }
}

fn default_name(kind: NodeKind) -> String {
    match kind {
        NodeKind::Frame => "Frame".to_string(),
        NodeKind::Text => "Text".to_string(),
        NodeKind::Component => "Component".to_string(),
    }
}

/// Create a node under `parent_path`, appending or inserting at `index`
/// (clamped to the child count).
///
/// # Errors
///
/// `ParentNotFound`, `ParentNotContainer`, `InvalidNode`.
pub fn create(
    doc: &Document,
    parent_path: &NodePath,
    spec: NewNode,
    index: Option<usize>,
) -> Result<OpOutcome, OpError> {
    let children = resolve_container(doc, parent_path, false)?;

    if let Some(key) = &spec.semantic_key {
        if find_by_semantic_key(doc, key).is_some() {
            return Err(OpError::InvalidNode {
                message: format!("semantic key \"{key}\" is already in use"),
            });
        }
    }

    let node = spec.build()?;
    let index = index.unwrap_or(children.len()).min(children.len());
    let patches = vec![PatchOp::Add {
        path: format!("{}/children/{index}", parent_path.pointer()),
        value: serde_json::to_value(&node)?,
    }];
    finish(doc, patches)
}

/// Shallow-merge field updates into the node with the given id.
///
/// Keys address top-level node fields; a key containing `/` addresses a
/// sub-path (for example `style/opacity`), which is how a single fill is
/// replaced without rewriting the whole sequence. A `null` value removes
/// an optional field. The `id` and `type` fields are immutable.
///
/// # Errors
///
/// `NodeNotFound`, `TypeChangeDisallowed`, `InvalidValue`.
pub fn update(
    doc: &Document,
    id: NodeId,
    updates: &Map<String, Value>,
) -> Result<OpOutcome, OpError> {
    let path = find_path_by_id(doc, id).ok_or_else(|| OpError::NodeNotFound {
        id: id.to_string(),
    })?;
    let node_pointer = path.pointer();
    let node_value = serde_json::to_value(path.resolve(doc).expect("path just resolved"))?;

    let mut patches = Vec::with_capacity(updates.len());
    for (key, value) in updates {
        let head = key.split('/').next().unwrap_or(key);
        if head == "id" || head == "type" {
            return Err(OpError::TypeChangeDisallowed {
                field: head.to_string(),
            });
        }

        let sub_pointer: String = key
            .split('/')
            .map(|segment| format!("/{}", escape_token(segment)))
            .collect();
        let target = format!("{node_pointer}{sub_pointer}");
        let exists = resolve_in(&node_value, &sub_pointer);

        if value.is_null() {
            if exists {
                patches.push(PatchOp::Remove { path: target });
            }
        } else if exists {
            patches.push(PatchOp::Replace {
                path: target,
                value: value.clone(),
            });
        } else {
            patches.push(PatchOp::Add {
                path: target,
                value: value.clone(),
            });
        }
    }

    let outcome = finish(doc, patches).map_err(|err| match err {
        OpError::Json(e) => OpError::InvalidValue {
            pointer: node_pointer.clone(),
            message: e.to_string(),
        },
        OpError::Patch(e) => OpError::InvalidValue {
            pointer: node_pointer.clone(),
            message: e.to_string(),
        },
        other => other,
    })?;

    // Field constraints (ranges, uniqueness) re-checked on the result.
    if let Some(violation) = validate_collect(&outcome.document).into_iter().next() {
        return Err(OpError::InvalidValue {
            pointer: violation.pointer,
            message: violation.message,
        });
    }
    Ok(outcome)
}

/// Delete the node with the given id, removing its whole subtree.
///
/// # Errors
///
/// `NodeNotFound`, `RootDeletionDisallowed`.
pub fn delete(doc: &Document, id: NodeId) -> Result<OpOutcome, OpError> {
    if doc.id == id || doc.artboards.iter().any(|ab| ab.id == id) {
        return Err(OpError::RootDeletionDisallowed { id: id.to_string() });
    }
    let path = find_path_by_id(doc, id).ok_or_else(|| OpError::NodeNotFound {
        id: id.to_string(),
    })?;
    let patches = vec![PatchOp::Remove {
        path: path.pointer(),
    }];
    finish(doc, patches)
}

/// Move a node under a new parent at the given index (clamped).
///
/// Detach-then-insert: the index is interpreted against the target child
/// sequence *after* the node has been detached, matching JSON-Patch `move`
/// semantics. The node keeps its identifier.
///
/// # Errors
///
/// `NodeNotFound`, `ParentNotFound`, `TargetNotContainer`,
/// `WouldCreateCycle`.
pub fn move_node(
    doc: &Document,
    id: NodeId,
    new_parent_path: &NodePath,
    index: usize,
) -> Result<OpOutcome, OpError> {
    let path = find_path_by_id(doc, id).ok_or_else(|| OpError::NodeNotFound {
        id: id.to_string(),
    })?;
    let target_children = resolve_container(doc, new_parent_path, true)?;

    if path == *new_parent_path || path.is_ancestor_of(new_parent_path) {
        return Err(OpError::WouldCreateCycle { id: id.to_string() });
    }

    // The source slot disappears before the insert happens.
    let same_parent = path.parent().as_ref() == Some(new_parent_path);
    let effective_len = if same_parent {
        target_children.len() - 1
    } else {
        target_children.len()
    };
    let index = index.min(effective_len);

    let patches = vec![PatchOp::Move {
        from: path.pointer(),
        path: format!("{}/children/{index}", new_parent_path.pointer()),
    }];
    finish(doc, patches)
}

/// Deep-copy the subtree rooted at the given id, inserting the copy
/// immediately after the source.
///
/// Every node in the copy gets a fresh identifier; semantic keys are not
/// copied (they are unique document-wide); the copy's root is renamed
/// `"<name> Copy"`.
///
/// # Errors
///
/// `NodeNotFound`.
pub fn duplicate(doc: &Document, id: NodeId) -> Result<OpOutcome, OpError> {
    let path = find_path_by_id(doc, id).ok_or_else(|| OpError::NodeNotFound {
        id: id.to_string(),
    })?;
    let source = path.resolve(doc).expect("path just resolved");

    let mut copy = source.clone();
    copy.name = format!("{} Copy", source.name);
    freshen(&mut copy);

    let parent = path.parent().expect("node paths always have a parent");
    let index = path.last_index().expect("node paths always have an index") + 1;
    let patches = vec![PatchOp::Add {
        path: format!("{}/children/{index}", parent.pointer()),
        value: serde_json::to_value(&copy)?,
    }];
    finish(doc, patches)
}

/// Allocate fresh identifiers and drop semantic keys throughout a subtree.
fn freshen(root: &mut Node) {
    let mut stack: Vec<&mut Node> = vec![root];
    while let Some(node) = stack.pop() {
        node.id = NodeId::generate();
        node.semantic_key = None;
        if let Some(children) = node.children_mut() {
            stack.extend(children.iter_mut());
        }
    }
}

/// Resolve a container path to its child slice, with operation-appropriate
/// errors (`for_move` selects `TargetNotContainer` over
/// `ParentNotContainer`).
fn resolve_container<'a>(
    doc: &'a Document,
    path: &NodePath,
    for_move: bool,
) -> Result<&'a [Node], OpError> {
    let pointer = path.pointer();
    if !path.is_node() {
        return match doc.artboards.get(path.artboard) {
            Some(artboard) => Ok(&artboard.children),
            None => Err(OpError::ParentNotFound { pointer }),
        };
    }
    let node = path
        .resolve(doc)
        .map_err(|_| OpError::ParentNotFound {
            pointer: pointer.clone(),
        })?;
    node.children().ok_or(if for_move {
        OpError::TargetNotContainer { pointer }
    } else {
        OpError::ParentNotContainer { pointer }
    })
}

/// Whether `sub_pointer` resolves inside `value`.
fn resolve_in(value: &Value, sub_pointer: &str) -> bool {
    let Ok(tokens) = parse_pointer(sub_pointer) else {
        return false;
    };
    let mut current = value;
    for token in &tokens {
        let next = match current {
            Value::Object(map) => map.get(token.as_str()),
            Value::Array(items) => token.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };
        match next {
            Some(v) => current = v,
            None => return false,
        }
    }
    true
}

/// Derive the outcome: invert against the pre-image, apply forward, parse.
fn finish(doc: &Document, patches: Vec<PatchOp>) -> Result<OpOutcome, OpError> {
    let pre_value = serde_json::to_value(doc)?;
    let inverse = invert(&patches, &pre_value)?;
    let post_value = apply(&pre_value, &patches)?;
    let document: Document = serde_json::from_value(post_value)?;
    Ok(OpOutcome {
        document,
        patches,
        inverse,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use easel_schema::canonical::serialize_document;
    use serde_json::json;

    /// One artboard with Outer(frame) > [Inner(text "hi")].
    fn sample_doc() -> Document {
        let mut doc = Document::new("Ops");
        let mut outer = Node::frame("Outer", Rect::new(0.0, 0.0, 200.0, 200.0));
        outer
            .children_mut()
            .unwrap()
            .push(Node::text("Inner", Rect::new(10.0, 10.0, 50.0, 20.0), "hi"));
        doc.artboards[0].children.push(outer);
        doc
    }

    fn outer_id(doc: &Document) -> NodeId {
        doc.artboards[0].children[0].id
    }

    fn inner_id(doc: &Document) -> NodeId {
        doc.artboards[0].children[0].children().unwrap()[0].id
    }

    // =========================================================================
    // CREATE
    // =========================================================================

    #[test]
    fn test_create_appends_to_artboard() {
        let doc = sample_doc();
        let outcome = create(
            &doc,
            &NodePath::artboard_root(0),
            NewNode::frame().with_name("Sidebar"),
            None,
        )
        .unwrap();

        assert_eq!(outcome.document.artboards[0].children.len(), 2);
        assert_eq!(outcome.document.artboards[0].children[1].name, "Sidebar");
        // Input untouched.
        assert_eq!(doc.artboards[0].children.len(), 1);
    }

    #[test]
    fn test_create_inserts_at_index() {
        let doc = sample_doc();
        let outcome = create(
            &doc,
            &NodePath::artboard_root(0),
            NewNode::text("first").with_name("First"),
            Some(0),
        )
        .unwrap();
        assert_eq!(outcome.document.artboards[0].children[0].name, "First");
        assert_eq!(outcome.document.artboards[0].children[1].name, "Outer");
    }

    #[test]
    fn test_create_nested_under_frame() {
        let doc = sample_doc();
        let parent = NodePath::new(0, vec![0]);
        let outcome = create(&doc, &parent, NewNode::component("lib/button"), None).unwrap();
        let children = outcome.document.artboards[0].children[0].children().unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(children[1].kind(), NodeKind::Component);
    }

    #[test]
    fn test_create_defaults() {
        let doc = sample_doc();
        let outcome = create(&doc, &NodePath::artboard_root(0), NewNode::frame(), None).unwrap();
        let node = &outcome.document.artboards[0].children[1];
        assert_eq!(node.name, "Frame");
        assert!(node.visible);
        assert_eq!(node.children().unwrap().len(), 0);
    }

    #[test]
    fn test_create_parent_not_found() {
        let doc = sample_doc();
        let err = create(&doc, &NodePath::new(0, vec![9]), NewNode::frame(), None).unwrap_err();
        assert!(matches!(err, OpError::ParentNotFound { .. }));
    }

    #[test]
    fn test_create_parent_not_container() {
        let doc = sample_doc();
        // The text node cannot own children.
        let err = create(&doc, &NodePath::new(0, vec![0, 0]), NewNode::frame(), None).unwrap_err();
        assert!(matches!(err, OpError::ParentNotContainer { .. }));
    }

    #[test]
    fn test_create_component_without_key_invalid() {
        let doc = sample_doc();
        let spec = NewNode {
            component_key: None,
            ..NewNode::component("x")
        };
        let err = create(&doc, &NodePath::artboard_root(0), spec, None).unwrap_err();
        assert!(matches!(err, OpError::InvalidNode { .. }));
    }

    #[test]
    fn test_create_duplicate_semantic_key_invalid() {
        let mut doc = sample_doc();
        doc.artboards[0].children[0].semantic_key = Some("hero.root".to_string());
        let err = create(
            &doc,
            &NodePath::artboard_root(0),
            NewNode::frame().with_semantic_key("hero.root"),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, OpError::InvalidNode { .. }));
    }

    #[test]
    fn test_create_roundtrip_via_inverse() {
        let doc = sample_doc();
        let outcome = create(&doc, &NodePath::artboard_root(0), NewNode::frame(), None).unwrap();

        let post = serde_json::to_value(&outcome.document).unwrap();
        let restored = apply(&post, &outcome.inverse).unwrap();
        assert_eq!(restored, serde_json::to_value(&doc).unwrap());
    }

    // =========================================================================
    // UPDATE
    // =========================================================================

    #[test]
    fn test_update_name_and_visibility() {
        let doc = sample_doc();
        let mut updates = Map::new();
        updates.insert("name".to_string(), json!("Renamed"));
        updates.insert("visible".to_string(), json!(false));

        let outcome = update(&doc, outer_id(&doc), &updates).unwrap();
        let node = &outcome.document.artboards[0].children[0];
        assert_eq!(node.name, "Renamed");
        assert!(!node.visible);
    }

    #[test]
    fn test_update_style_wholesale() {
        let doc = sample_doc();
        let mut updates = Map::new();
        updates.insert(
            "style".to_string(),
            json!({ "fills": [ { "color": "#222" } ] }),
        );
        let outcome = update(&doc, outer_id(&doc), &updates).unwrap();
        let style = outcome.document.artboards[0].children[0].style.as_ref().unwrap();
        assert_eq!(style.fills[0].color.as_deref(), Some("#222"));
    }

    #[test]
    fn test_update_style_sub_path() {
        let mut doc = sample_doc();
        doc.artboards[0].children[0].style = Some(Style {
            fills: vec![easel_schema::Fill::solid("#111")],
            ..Style::default()
        });
        let mut updates = Map::new();
        updates.insert("style/fills/0/color".to_string(), json!("#333"));

        let outcome = update(&doc, outer_id(&doc), &updates).unwrap();
        let style = outcome.document.artboards[0].children[0].style.as_ref().unwrap();
        assert_eq!(style.fills[0].color.as_deref(), Some("#333"));
    }

    #[test]
    fn test_update_null_removes_optional_field() {
        let mut doc = sample_doc();
        doc.artboards[0].children[0].bind = Some("tokens.color.primary".to_string());
        let mut updates = Map::new();
        updates.insert("bind".to_string(), Value::Null);

        let outcome = update(&doc, outer_id(&doc), &updates).unwrap();
        assert!(outcome.document.artboards[0].children[0].bind.is_none());
    }

    #[test]
    fn test_update_rejects_id_and_type() {
        let doc = sample_doc();
        for field in ["id", "type"] {
            let mut updates = Map::new();
            updates.insert(field.to_string(), json!("x"));
            let err = update(&doc, outer_id(&doc), &updates).unwrap_err();
            assert!(matches!(err, OpError::TypeChangeDisallowed { .. }));
        }
    }

    #[test]
    fn test_update_invalid_value_rejected() {
        let doc = sample_doc();
        let mut updates = Map::new();
        updates.insert(
            "frame".to_string(),
            json!({ "x": 0.0, "y": 0.0, "width": -10.0, "height": 5.0 }),
        );
        let err = update(&doc, outer_id(&doc), &updates).unwrap_err();
        assert!(matches!(err, OpError::InvalidValue { .. }));
    }

    #[test]
    fn test_update_unknown_node() {
        let doc = sample_doc();
        let mut updates = Map::new();
        updates.insert("name".to_string(), json!("x"));
        let err = update(&doc, NodeId::generate(), &updates).unwrap_err();
        assert!(matches!(err, OpError::NodeNotFound { .. }));
    }

    #[test]
    fn test_update_roundtrip_via_inverse() {
        let doc = sample_doc();
        let mut updates = Map::new();
        updates.insert("name".to_string(), json!("Renamed"));
        let outcome = update(&doc, outer_id(&doc), &updates).unwrap();

        let post = serde_json::to_value(&outcome.document).unwrap();
        let restored = apply(&post, &outcome.inverse).unwrap();
        assert_eq!(restored, serde_json::to_value(&doc).unwrap());
    }

    // =========================================================================
    // DELETE
    // =========================================================================

    #[test]
    fn test_delete_removes_subtree() {
        let doc = sample_doc();
        let outcome = delete(&doc, outer_id(&doc)).unwrap();
        assert!(outcome.document.artboards[0].children.is_empty());
    }

    #[test]
    fn test_delete_unknown_node() {
        let doc = sample_doc();
        assert!(matches!(
            delete(&doc, NodeId::generate()),
            Err(OpError::NodeNotFound { .. })
        ));
    }

    #[test]
    fn test_delete_artboard_disallowed() {
        let doc = sample_doc();
        let artboard_id = doc.artboards[0].id;
        assert!(matches!(
            delete(&doc, artboard_id),
            Err(OpError::RootDeletionDisallowed { .. })
        ));
        assert!(matches!(
            delete(&doc, doc.id),
            Err(OpError::RootDeletionDisallowed { .. })
        ));
    }

    #[test]
    fn test_delete_inverse_restores_canonical_bytes() {
        let doc = sample_doc();
        let outcome = delete(&doc, inner_id(&doc)).unwrap();

        let post = serde_json::to_value(&outcome.document).unwrap();
        let restored = apply(&post, &outcome.inverse).unwrap();
        let restored_doc: Document = serde_json::from_value(restored).unwrap();
        assert_eq!(
            serialize_document(&restored_doc).unwrap(),
            serialize_document(&doc).unwrap()
        );
    }

    // =========================================================================
    // MOVE
    // =========================================================================

    /// Artboard children: [A(frame), B(frame), C(text)].
    fn flat_doc() -> Document {
        let mut doc = Document::new("Flat");
        doc.artboards[0]
            .children
            .push(Node::frame("A", Rect::new(0.0, 0.0, 10.0, 10.0)));
        doc.artboards[0]
            .children
            .push(Node::frame("B", Rect::new(0.0, 0.0, 10.0, 10.0)));
        doc.artboards[0]
            .children
            .push(Node::text("C", Rect::new(0.0, 0.0, 10.0, 10.0), "c"));
        doc
    }

    #[test]
    fn test_move_within_parent() {
        let doc = flat_doc();
        let a_id = doc.artboards[0].children[0].id;
        let outcome = move_node(&doc, a_id, &NodePath::artboard_root(0), 2).unwrap();
        let names: Vec<_> = outcome.document.artboards[0]
            .children
            .iter()
            .map(|n| n.name.clone())
            .collect();
        assert_eq!(names, ["B", "C", "A"]);
    }

    #[test]
    fn test_move_to_new_parent_preserves_id() {
        let doc = flat_doc();
        let c_id = doc.artboards[0].children[2].id;
        let outcome = move_node(&doc, c_id, &NodePath::new(0, vec![0]), 0).unwrap();

        let a_children = outcome.document.artboards[0].children[0].children().unwrap();
        assert_eq!(a_children.len(), 1);
        assert_eq!(a_children[0].id, c_id);
        assert_eq!(outcome.document.artboards[0].children.len(), 2);
    }

    #[test]
    fn test_move_index_clamped() {
        let doc = flat_doc();
        let a_id = doc.artboards[0].children[0].id;
        let outcome = move_node(&doc, a_id, &NodePath::artboard_root(0), 99).unwrap();
        let names: Vec<_> = outcome.document.artboards[0]
            .children
            .iter()
            .map(|n| n.name.clone())
            .collect();
        assert_eq!(names, ["B", "C", "A"]);
    }

    #[test]
    fn test_move_into_own_subtree_is_cycle() {
        let doc = sample_doc();
        let id = outer_id(&doc);
        // Outer into itself.
        let err = move_node(&doc, id, &NodePath::new(0, vec![0]), 0).unwrap_err();
        assert!(matches!(err, OpError::WouldCreateCycle { .. }));
    }

    #[test]
    fn test_move_into_leaf_rejected() {
        let doc = flat_doc();
        let a_id = doc.artboards[0].children[0].id;
        // C is a text node.
        let err = move_node(&doc, a_id, &NodePath::new(0, vec![2]), 0).unwrap_err();
        assert!(matches!(err, OpError::TargetNotContainer { .. }));
    }

    #[test]
    fn test_move_roundtrip_via_inverse() {
        let doc = flat_doc();
        let a_id = doc.artboards[0].children[0].id;
        let outcome = move_node(&doc, a_id, &NodePath::new(0, vec![1]), 0).unwrap();

        let post = serde_json::to_value(&outcome.document).unwrap();
        let restored = apply(&post, &outcome.inverse).unwrap();
        assert_eq!(restored, serde_json::to_value(&doc).unwrap());
    }

    // =========================================================================
    // DUPLICATE
    // =========================================================================

    #[test]
    fn test_duplicate_inserts_after_source_with_fresh_ids() {
        let mut doc = sample_doc();
        doc.artboards[0].children[0].semantic_key = Some("hero.root".to_string());
        let source_id = outer_id(&doc);
        let inner = inner_id(&doc);

        let outcome = duplicate(&doc, source_id).unwrap();
        let children = &outcome.document.artboards[0].children;
        assert_eq!(children.len(), 2);

        let copy = &children[1];
        assert_eq!(copy.name, "Outer Copy");
        assert_ne!(copy.id, source_id);
        assert_ne!(copy.children().unwrap()[0].id, inner);
        // Semantic keys are not copied.
        assert!(copy.semantic_key.is_none());
        // The source is untouched.
        assert_eq!(children[0].id, source_id);
        assert_eq!(children[0].semantic_key.as_deref(), Some("hero.root"));
    }

    #[test]
    fn test_duplicate_unknown_node() {
        let doc = sample_doc();
        assert!(matches!(
            duplicate(&doc, NodeId::generate()),
            Err(OpError::NodeNotFound { .. })
        ));
    }

    #[test]
    fn test_duplicate_inverse_restores_canonical_bytes() {
        let doc = sample_doc();
        let outcome = duplicate(&doc, outer_id(&doc)).unwrap();

        let post = serde_json::to_value(&outcome.document).unwrap();
        let restored = apply(&post, &outcome.inverse).unwrap();
        let restored_doc: Document = serde_json::from_value(restored).unwrap();
        assert_eq!(
            serialize_document(&restored_doc).unwrap(),
            serialize_document(&doc).unwrap()
        );
    }

    #[test]
    fn test_no_duplicate_ids_after_operations() {
        let doc = sample_doc();
        let outcome = duplicate(&doc, outer_id(&doc)).unwrap();
        assert!(easel_schema::validate(&outcome.document).is_ok());
    }
}
