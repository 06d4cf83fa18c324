//! # Pre-order Traversal
//!
//! A lazy, restartable walk over every node in a document, yielding each
//! node with its path, depth, and artboard index. Ordering is artboard
//! index ascending, then child index ascending at each level: the same
//! order nodes paint in.
//!
//! The iterator holds an explicit stack (no recursion) and terminates
//! cleanly when dropped. The predicate filter applies to what is *yielded*,
//! not to what is descended into: a filtered-out frame's children are still
//! visited.
//!
//! ## Example
//!
//! ```rust
//! use easel_schema::{Document, Node, Rect};
//! use easel_tree::{walk, WalkConfig};
//!
//! let mut doc = Document::new("Walk");
//! doc.artboards[0].children.push(Node::frame("Hero", Rect::new(0.0, 0.0, 10.0, 10.0)));
//!
//! let names: Vec<_> = walk(&doc, WalkConfig::default())
//!     .map(|visit| visit.node.name.clone())
//!     .collect();
//! assert_eq!(names, ["Hero"]);
//! ```

use crate::path::NodePath;
use easel_schema::{Document, Node, NodeId, NodeKind};
use regex::Regex;
use serde::Serialize;

/// One yielded node during traversal.
#[derive(Debug, Clone)]
pub struct Visit<'a> {
    /// The visited node.
    pub node: &'a Node,
    /// Its path from the document root.
    pub path: NodePath,
    /// Nesting depth: 0 for direct children of an artboard.
    pub depth: usize,
    /// Index of the owning artboard.
    pub artboard_index: usize,
}

/// Traversal configuration.
#[derive(Default)]
pub struct WalkConfig<'a> {
    /// Deepest level to yield and descend into (0 = artboard children
    /// only). `None` means unbounded.
    pub max_depth: Option<usize>,

    /// Restrict the walk to a single artboard.
    pub artboard: Option<usize>,

    /// Yield only nodes matching the predicate. Does not prune subtrees.
    #[allow(clippy::type_complexity)]
    pub filter: Option<Box<dyn Fn(&Node) -> bool + 'a>>,
}

/// Lazy pre-order iterator over a document. Create with [`walk`].
pub struct Walk<'a> {
    stack: Vec<(&'a Node, NodePath)>,
    config: WalkConfig<'a>,
}

/// Start a pre-order walk over `doc`.
#[must_use]
pub fn walk<'a>(doc: &'a Document, config: WalkConfig<'a>) -> Walk<'a> {
    let mut stack = Vec::new();
    // Artboards are seeded in reverse so the stack pops them ascending.
    for (ab_index, artboard) in doc.artboards.iter().enumerate().rev() {
        if config.artboard.is_some_and(|only| only != ab_index) {
            continue;
        }
        let root = NodePath::artboard_root(ab_index);
        for (i, child) in artboard.children.iter().enumerate().rev() {
            stack.push((child, root.child(i)));
        }
    }
    Walk { stack, config }
}

impl<'a> Iterator for Walk<'a> {
    type Item = Visit<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((node, path)) = self.stack.pop() {
            let depth = path.depth();

            if self
                .config
                .max_depth
                .map_or(true, |max| depth < max)
            {
                if let Some(children) = node.children() {
                    for (i, child) in children.iter().enumerate().rev() {
                        self.stack.push((child, path.child(i)));
                    }
                }
            }

            if let Some(filter) = &self.config.filter {
                if !filter(node) {
                    continue;
                }
            }

            let artboard_index = path.artboard;
            return Some(Visit {
                node,
                path,
                depth,
                artboard_index,
            });
        }
        None
    }
}

/// Find a node by identifier.
#[must_use]
pub fn find_by_id<'a>(doc: &'a Document, id: NodeId) -> Option<Visit<'a>> {
    walk(doc, WalkConfig::default()).find(|visit| visit.node.id == id)
}

/// Find a node's path by identifier.
#[must_use]
pub fn find_path_by_id(doc: &Document, id: NodeId) -> Option<NodePath> {
    find_by_id(doc, id).map(|visit| visit.path)
}

/// All nodes of the given kind, in document order.
#[must_use]
pub fn find_by_type(doc: &Document, kind: NodeKind) -> Vec<Visit<'_>> {
    walk(doc, WalkConfig::default())
        .filter(|visit| visit.node.kind() == kind)
        .collect()
}

/// All nodes whose name matches the pattern, in document order.
#[must_use]
pub fn find_by_name<'a>(doc: &'a Document, pattern: &Regex) -> Vec<Visit<'a>> {
    walk(doc, WalkConfig::default())
        .filter(|visit| pattern.is_match(&visit.node.name))
        .collect()
}

/// The node carrying the given semantic key, if any. Keys are unique
/// document-wide, so at most one node matches.
#[must_use]
pub fn find_by_semantic_key<'a>(doc: &'a Document, key: &str) -> Option<Visit<'a>> {
    walk(doc, WalkConfig::default())
        .find(|visit| visit.node.semantic_key.as_deref() == Some(key))
}

/// The chain of container nodes above a path, outermost first. The artboard
/// itself is not a node and is not included.
#[must_use]
pub fn ancestors<'a>(doc: &'a Document, path: &NodePath) -> Vec<Visit<'a>> {
    let mut out = Vec::new();
    let mut cursor = path.parent();
    while let Some(current) = cursor {
        if let Ok(node) = current.resolve(doc) {
            out.push(Visit {
                node,
                depth: current.depth(),
                artboard_index: current.artboard,
                path: current.clone(),
            });
        }
        cursor = current.parent();
    }
    out.reverse();
    out
}

/// The subtree at `path` in pre-order: every node strictly inside it,
/// preceded by the root node itself when `include_root` is set.
#[must_use]
pub fn descendants<'a>(doc: &'a Document, path: &NodePath, include_root: bool) -> Vec<Visit<'a>> {
    walk(
        doc,
        WalkConfig {
            artboard: Some(path.artboard),
            ..WalkConfig::default()
        },
    )
    .filter(|visit| {
        path.is_ancestor_of(&visit.path) || (include_root && visit.path == *path)
    })
    .collect()
}

/// Total node count across all artboards.
#[must_use]
pub fn count_nodes(doc: &Document) -> usize {
    walk(doc, WalkConfig::default()).count()
}

/// Aggregate tree statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeStats {
    pub artboard_count: usize,
    pub node_count: usize,
    pub frame_count: usize,
    pub text_count: usize,
    pub component_count: usize,
    /// Deepest nesting level observed (0 = artboard children only);
    /// zero for an empty document.
    pub max_depth: usize,
}

/// Compute [`TreeStats`] in one walk.
#[must_use]
pub fn stats(doc: &Document) -> TreeStats {
    let mut out = TreeStats {
        artboard_count: doc.artboards.len(),
        ..TreeStats::default()
    };
    for visit in walk(doc, WalkConfig::default()) {
        out.node_count += 1;
        out.max_depth = out.max_depth.max(visit.depth);
        match visit.node.kind() {
            NodeKind::Frame => out.frame_count += 1,
            NodeKind::Text => out.text_count += 1,
            NodeKind::Component => out.component_count += 1,
        }
    }
    out
}
