//! # Hit Testing
//!
//! Resolves a point to the stack of nodes under it, topmost first. Paint
//! order determines z-order: siblings paint in sequence (later on top) and
//! children paint above their parent, so the hit list is collected in paint
//! order and reversed. Invisible nodes do not paint, and nothing inside an
//! invisible subtree is hit.
//!
//! Node frames are interpreted in artboard coordinates. The first result,
//! when any exists, is the selection candidate.

use crate::path::NodePath;
use easel_schema::{Document, Node, NodeId};
use serde::Serialize;

/// A point in artboard coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One node under the queried point.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HitResult {
    /// Identifier of the hit node.
    pub id: NodeId,
    /// Path to the hit node.
    pub path: NodePath,
    /// Nesting depth of the hit node.
    pub depth: usize,
    /// Index of the owning artboard.
    pub artboard_index: usize,
}

/// All visible nodes whose frame contains `point`, topmost first.
#[must_use]
pub fn hit_test(doc: &Document, point: Point) -> Vec<HitResult> {
    let mut hits = Vec::new();

    for (ab_index, artboard) in doc.artboards.iter().enumerate() {
        if !artboard.frame.contains(point.x, point.y) {
            continue;
        }
        let root = NodePath::artboard_root(ab_index);

        // Explicit stack in paint order: parent first, siblings ascending.
        let mut stack: Vec<(&Node, NodePath)> = Vec::new();
        for (i, child) in artboard.children.iter().enumerate().rev() {
            stack.push((child, root.child(i)));
        }
        while let Some((node, path)) = stack.pop() {
            if !node.visible {
                continue;
            }
            if node.frame.contains(point.x, point.y) {
                hits.push(HitResult {
                    id: node.id,
                    depth: path.depth(),
                    artboard_index: ab_index,
                    path: path.clone(),
                });
            }
            if let Some(children) = node.children() {
                for (i, child) in children.iter().enumerate().rev() {
                    stack.push((child, path.child(i)));
                }
            }
        }
    }

    hits.reverse();
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use easel_schema::{Node, Rect};

    /// One artboard with two overlapping sibling frames; the second sibling
    /// contains a text child that also covers the probe point.
    fn overlapping_doc() -> Document {
        let mut doc = Document::new("Hits");
        doc.artboards[0].frame = Rect::new(0.0, 0.0, 1000.0, 1000.0);

        let a = Node::frame("A", Rect::new(0.0, 0.0, 100.0, 100.0));
        let mut b = Node::frame("B", Rect::new(50.0, 50.0, 100.0, 100.0));
        b.children_mut()
            .unwrap()
            .push(Node::text("B-label", Rect::new(60.0, 60.0, 30.0, 20.0), "b"));
        doc.artboards[0].children.push(a);
        doc.artboards[0].children.push(b);
        doc
    }

    fn names_of(doc: &Document, hits: &[HitResult]) -> Vec<String> {
        hits.iter()
            .map(|hit| hit.path.resolve(doc).unwrap().name.clone())
            .collect()
    }

    #[test]
    fn test_topmost_is_last_sibling() {
        let doc = overlapping_doc();
        // (75, 75) is inside A, B, and B-label.
        let hits = hit_test(&doc, Point::new(75.0, 75.0));
        assert_eq!(names_of(&doc, &hits), ["B-label", "B", "A"]);
    }

    #[test]
    fn test_child_paints_above_parent() {
        let doc = overlapping_doc();
        // (60, 60) is inside A, B, and the top-left corner of B-label.
        let hits = hit_test(&doc, Point::new(60.0, 60.0));
        assert_eq!(names_of(&doc, &hits).first().map(String::as_str), Some("B-label"));
    }

    #[test]
    fn test_miss_returns_empty() {
        let doc = overlapping_doc();
        assert!(hit_test(&doc, Point::new(500.0, 500.0)).is_empty());
    }

    #[test]
    fn test_point_outside_artboard_misses() {
        let doc = overlapping_doc();
        assert!(hit_test(&doc, Point::new(-10.0, -10.0)).is_empty());
    }

    #[test]
    fn test_invisible_node_excluded() {
        let mut doc = overlapping_doc();
        doc.artboards[0].children[1].visible = false;
        let hits = hit_test(&doc, Point::new(75.0, 75.0));
        // B and its child are both gone; only A remains.
        assert_eq!(names_of(&doc, &hits), ["A"]);
    }

    #[test]
    fn test_invisible_subtree_pruned() {
        let mut doc = overlapping_doc();
        doc.artboards[0].children[1]
            .children_mut()
            .unwrap()[0]
            .visible = false;
        let hits = hit_test(&doc, Point::new(75.0, 75.0));
        assert_eq!(names_of(&doc, &hits), ["B", "A"]);
    }

    #[test]
    fn test_single_hit_non_overlapping_region() {
        let doc = overlapping_doc();
        // (10, 10) is only inside A.
        let hits = hit_test(&doc, Point::new(10.0, 10.0));
        assert_eq!(names_of(&doc, &hits), ["A"]);
        assert_eq!(hits[0].depth, 0);
        assert_eq!(hits[0].artboard_index, 0);
    }
}
