//! Error types for tree queries.

use thiserror::Error;

/// Errors from path resolution and node lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// A node path did not resolve to a node.
    #[error("no node at path {pointer}")]
    PathNotFound {
        /// JSON Pointer rendering of the failed path.
        pointer: String,
    },

    /// No node with the given identifier exists in the document.
    #[error("no node with id {id}")]
    NodeNotFound {
        /// The identifier that was looked up.
        id: String,
    },
}
