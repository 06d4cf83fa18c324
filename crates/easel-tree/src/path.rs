//! # Node Paths
//!
//! A [`NodePath`] is the route from the document root to one node: an
//! artboard index followed by a child index per nesting level. On the wire
//! and in diagnostics it renders as a JSON Pointer
//! (`/artboards/0/children/2/children/1`), which is also the address space
//! used by patches.
//!
//! A path with no child indices addresses the artboard itself; that is a
//! valid *container* path (a create target) but not a node path.

use crate::error::TreeError;
use easel_schema::{Document, Node};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Route from the document root to a node or container.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodePath {
    /// Index into `document.artboards`.
    pub artboard: usize,

    /// Child index at each nesting level, outermost first. Empty means the
    /// artboard's own child sequence.
    pub indices: Vec<usize>,
}

impl NodePath {
    /// The container path for an artboard's direct children.
    #[must_use]
    pub fn artboard_root(artboard: usize) -> Self {
        Self {
            artboard,
            indices: Vec::new(),
        }
    }

    /// Construct a path from an artboard index and child indices.
    #[must_use]
    pub fn new(artboard: usize, indices: Vec<usize>) -> Self {
        Self { artboard, indices }
    }

    /// Extend this path by one child index.
    #[must_use]
    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.indices.clone();
        indices.push(index);
        Self {
            artboard: self.artboard,
            indices,
        }
    }

    /// The parent path, or `None` at artboard level.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.indices.is_empty() {
            return None;
        }
        let mut indices = self.indices.clone();
        indices.pop();
        Some(Self {
            artboard: self.artboard,
            indices,
        })
    }

    /// The final child index, or `None` at artboard level.
    #[must_use]
    pub fn last_index(&self) -> Option<usize> {
        self.indices.last().copied()
    }

    /// Nesting depth: 0 for a direct child of an artboard.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.indices.len().saturating_sub(1)
    }

    /// Whether this path addresses a node (rather than an artboard root).
    #[must_use]
    pub fn is_node(&self) -> bool {
        !self.indices.is_empty()
    }

    /// Whether `other` lies strictly inside this path's subtree.
    ///
    /// An artboard root is an ancestor of every node on that artboard.
    #[must_use]
    pub fn is_ancestor_of(&self, other: &Self) -> bool {
        self.artboard == other.artboard
            && self.indices.len() < other.indices.len()
            && other.indices[..self.indices.len()] == self.indices[..]
    }

    /// JSON Pointer rendering (`/artboards/0/children/2`).
    #[must_use]
    pub fn pointer(&self) -> String {
        let mut out = format!("/artboards/{}", self.artboard);
        for index in &self.indices {
            out.push_str("/children/");
            out.push_str(&index.to_string());
        }
        out
    }

    /// Resolve to the addressed node.
    ///
    /// # Errors
    ///
    /// [`TreeError::PathNotFound`] when any index is out of range, when a
    /// non-container is indexed into, or when the path addresses an
    /// artboard root instead of a node.
    pub fn resolve<'a>(&self, doc: &'a Document) -> Result<&'a Node, TreeError> {
        let missing = || TreeError::PathNotFound {
            pointer: self.pointer(),
        };
        let artboard = doc.artboards.get(self.artboard).ok_or_else(missing)?;
        let (first, rest) = self.indices.split_first().ok_or_else(missing)?;
        let mut node = artboard.children.get(*first).ok_or_else(missing)?;
        for index in rest {
            node = node
                .children()
                .and_then(|children| children.get(*index))
                .ok_or_else(missing)?;
        }
        Ok(node)
    }

    /// Resolve to the child sequence of the addressed container (an
    /// artboard root or a frame node).
    ///
    /// # Errors
    ///
    /// [`TreeError::PathNotFound`] when the path does not resolve or the
    /// addressed node is not a container.
    pub fn resolve_children<'a>(&self, doc: &'a Document) -> Result<&'a [Node], TreeError> {
        if self.indices.is_empty() {
            let artboard = doc
                .artboards
                .get(self.artboard)
                .ok_or_else(|| TreeError::PathNotFound {
                    pointer: self.pointer(),
                })?;
            return Ok(&artboard.children);
        }
        let node = self.resolve(doc)?;
        node.children().ok_or_else(|| TreeError::PathNotFound {
            pointer: self.pointer(),
        })
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pointer())
    }
}
