//! # Correspondence Indexing
//!
//! Before merging, all three trees are walked once to build the
//! correspondence indices. Two nodes in different branches correspond when
//! they share a semantic key or, lacking one, an identifier.
//!
//! A branch may attach a semantic key to a node that carries none in the
//! ancestor. To keep correspondence stable across that edit, the combined
//! index maps every identifier to the first semantic key observed for it
//! (base first, then local, then remote), and a node's [`MergeKey`] is
//! resolved through that map.

use easel_schema::{Document, Node, NodeId};
use easel_tree::{walk, WalkConfig};
use std::collections::HashMap;

/// Stable merge identity of a node: semantic key when one is known for it,
/// identifier otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MergeKey {
    /// Semantic-key correspondence (`hero.title`).
    Semantic(String),
    /// Identifier correspondence.
    Id(NodeId),
}

impl std::fmt::Display for MergeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Semantic(key) => write!(f, "key:{key}"),
            Self::Id(id) => write!(f, "id:{id}"),
        }
    }
}

/// Combined correspondence index over base, local, and remote.
#[derive(Debug, Default)]
pub struct Correspondence {
    /// Identifier → adopted semantic key.
    id_to_key: HashMap<NodeId, String>,
    /// Per-branch presence of each merge key.
    in_base: HashMap<MergeKey, NodeId>,
    in_local: HashMap<MergeKey, NodeId>,
    in_remote: HashMap<MergeKey, NodeId>,
}

impl Correspondence {
    /// Build the index by walking all three trees.
    #[must_use]
    pub fn build(base: &Document, local: &Document, remote: &Document) -> Self {
        let mut index = Self::default();
        // Base first so the ancestor's keys win when branches disagree.
        for doc in [base, local, remote] {
            for visit in walk(doc, WalkConfig::default()) {
                if let Some(key) = &visit.node.semantic_key {
                    index
                        .id_to_key
                        .entry(visit.node.id)
                        .or_insert_with(|| key.clone());
                }
            }
        }
        for visit in walk(base, WalkConfig::default()) {
            let key = index.key_of(visit.node);
            index.in_base.insert(key, visit.node.id);
        }
        for visit in walk(local, WalkConfig::default()) {
            let key = index.key_of(visit.node);
            index.in_local.insert(key, visit.node.id);
        }
        for visit in walk(remote, WalkConfig::default()) {
            let key = index.key_of(visit.node);
            index.in_remote.insert(key, visit.node.id);
        }
        index
    }

    /// The merge identity of a node: its own semantic key, a key adopted
    /// for its identifier by any branch, or the identifier itself.
    #[must_use]
    pub fn key_of(&self, node: &Node) -> MergeKey {
        if let Some(key) = &node.semantic_key {
            return MergeKey::Semantic(key.clone());
        }
        if let Some(key) = self.id_to_key.get(&node.id) {
            return MergeKey::Semantic(key.clone());
        }
        MergeKey::Id(node.id)
    }

    /// Whether the key exists anywhere in the ancestor.
    #[must_use]
    pub fn in_base(&self, key: &MergeKey) -> bool {
        self.in_base.contains_key(key)
    }

    /// Whether the key exists anywhere in the local branch.
    #[must_use]
    pub fn in_local(&self, key: &MergeKey) -> bool {
        self.in_local.contains_key(key)
    }

    /// Whether the key exists anywhere in the remote branch.
    #[must_use]
    pub fn in_remote(&self, key: &MergeKey) -> bool {
        self.in_remote.contains_key(key)
    }

    /// The identifier carrying this key in the ancestor, if any.
    #[must_use]
    pub fn id_in_base(&self, key: &MergeKey) -> Option<NodeId> {
        self.in_base.get(key).copied()
    }

    /// The identifier carrying this key in the local branch, if any.
    #[must_use]
    pub fn id_in_local(&self, key: &MergeKey) -> Option<NodeId> {
        self.in_local.get(key).copied()
    }

    /// The identifier carrying this key in the remote branch, if any.
    #[must_use]
    pub fn id_in_remote(&self, key: &MergeKey) -> Option<NodeId> {
        self.in_remote.get(key).copied()
    }
}
