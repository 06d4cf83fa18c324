//! Error types for the operation layer.

use thiserror::Error;

/// Errors from JSON-Patch application and inversion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchError {
    /// A pointer was syntactically invalid.
    #[error("invalid JSON pointer \"{pointer}\"")]
    InvalidPointer {
        /// The offending pointer text.
        pointer: String,
    },

    /// A pointer did not resolve against the document.
    #[error("no value at \"{pointer}\"")]
    TargetNotFound {
        /// The pointer that failed to resolve.
        pointer: String,
    },

    /// A `test` operation's expected value did not match.
    #[error("test precondition failed at \"{pointer}\"")]
    PreconditionFailed {
        /// The pointer whose value mismatched.
        pointer: String,
    },
}

/// Errors from node operations.
#[derive(Debug, Error)]
pub enum OpError {
    /// The requested parent path does not resolve.
    #[error("parent not found at {pointer}")]
    ParentNotFound {
        /// Pointer rendering of the requested parent path.
        pointer: String,
    },

    /// The parent path resolves to a node that cannot own children.
    #[error("parent at {pointer} is not a container")]
    ParentNotContainer {
        /// Pointer rendering of the requested parent path.
        pointer: String,
    },

    /// The move target resolves to a node that cannot own children.
    #[error("move target at {pointer} is not a container")]
    TargetNotContainer {
        /// Pointer rendering of the move target path.
        pointer: String,
    },

    /// The node to create was internally inconsistent.
    #[error("invalid node: {message}")]
    InvalidNode {
        /// What was wrong with the node specification.
        message: String,
    },

    /// No node with the given identifier exists.
    #[error("no node with id {id}")]
    NodeNotFound {
        /// The identifier that was looked up.
        id: String,
    },

    /// The identifier names an artboard; artboards are not deletable nodes.
    #[error("cannot delete document root {id}")]
    RootDeletionDisallowed {
        /// The artboard or document identifier.
        id: String,
    },

    /// An update attempted to change an immutable field (`id` or `type`).
    #[error("field \"{field}\" cannot be changed by update")]
    TypeChangeDisallowed {
        /// The immutable field that was targeted.
        field: String,
    },

    /// An updated field violates its constraint.
    #[error("invalid value at {pointer}: {message}")]
    InvalidValue {
        /// Pointer to the offending field.
        pointer: String,
        /// Constraint description.
        message: String,
    },

    /// The move would make a node its own ancestor.
    #[error("moving {id} would create a cycle")]
    WouldCreateCycle {
        /// The node being moved.
        id: String,
    },

    /// A growth threshold was crossed (see `budget`).
    #[error("budget exceeded: {message}")]
    BudgetExceeded {
        /// Which threshold, with observed and allowed values.
        message: String,
    },

    /// Patch application failed (also covers `test` preconditions).
    #[error(transparent)]
    Patch(#[from] PatchError),

    /// Internal serialization failure; unreachable for well-formed models.
    #[error("serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}
