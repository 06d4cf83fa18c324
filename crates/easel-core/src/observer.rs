//! # Observability Hooks
//!
//! The engine emits timing events around operations and merges through a
//! caller-supplied observer handle. There is no global listener registry:
//! whoever constructs the [`Engine`](crate::Engine) passes the observer in,
//! and the default is a no-op.
//!
//! Observers are informational only. They run on success and error paths
//! alike and cannot change outcomes; a panicking observer is a bug in the
//! host, not in the engine.

use std::time::Duration;

/// The operation kinds reported in events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    Create,
    Update,
    Delete,
    Move,
    Duplicate,
}

impl std::fmt::Display for OpKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Create => f.write_str("create"),
            Self::Update => f.write_str("update"),
            Self::Delete => f.write_str("delete"),
            Self::Move => f.write_str("move"),
            Self::Duplicate => f.write_str("duplicate"),
        }
    }
}

/// One engine lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// A node operation began.
    OpStarted {
        /// Which operation.
        op: OpKind,
    },

    /// A node operation finished successfully.
    OpCompleted {
        /// Which operation.
        op: OpKind,
        /// Wall time spent.
        duration: Duration,
        /// Number of forward patches produced.
        patch_count: usize,
    },

    /// A node operation failed.
    OpFailed {
        /// Which operation.
        op: OpKind,
        /// Wall time spent before failing.
        duration: Duration,
        /// Stable error code.
        code: &'static str,
    },

    /// A merge began.
    MergeStarted,

    /// A merge finished successfully.
    MergeCompleted {
        /// Wall time spent.
        duration: Duration,
        /// Number of conflicts reported.
        conflict_count: usize,
    },

    /// A merge failed.
    MergeFailed {
        /// Wall time spent before failing.
        duration: Duration,
        /// Stable error code.
        code: &'static str,
    },
}

/// Receiver for [`EngineEvent`]s.
pub trait EngineObserver: Send + Sync {
    /// Called synchronously around engine entry points.
    fn on_event(&self, event: &EngineEvent);
}

/// The default observer: ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl EngineObserver for NoopObserver {
    fn on_event(&self, _event: &EngineEvent) {}
}
