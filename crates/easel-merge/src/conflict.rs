//! # Conflict Records
//!
//! The closed set of conflict codes and the record shape every conflict is
//! reported in. The codes are stable contract: hosting tools key UI
//! messages and tests off them, so new classes extend the set rather than
//! repurposing existing codes.

use easel_schema::NodeId;
use serde::Serialize;
use serde_json::Value;

/// Stable conflict classification codes.
///
/// `P-*` codes are property conflicts, `S-*` structural, `C-*` content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ConflictCode {
    /// Both sides changed the same field to different values.
    #[serde(rename = "P-001")]
    DivergentProperty,

    /// One side edited a node the other side deleted.
    #[serde(rename = "S-001")]
    EditDelete,

    /// Both sides reordered the same children incompatibly.
    #[serde(rename = "S-002")]
    OrderConflict,

    /// Both sides added the same identity with different content.
    #[serde(rename = "C-001")]
    DivergentAdd,
}

impl ConflictCode {
    /// The wire form of the code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DivergentProperty => "P-001",
            Self::EditDelete => "S-001",
            Self::OrderConflict => "S-002",
            Self::DivergentAdd => "C-001",
        }
    }
}

impl std::fmt::Display for ConflictCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reported merge conflict.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    /// Stable classification code.
    pub code: ConflictCode,

    /// The involved node, when the conflict is about one node.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<NodeId>,

    /// JSON Pointer to the node or container the conflict is about.
    pub pointer: String,

    /// The disputed field, for property conflicts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,

    /// The ancestor's value of the disputed item, when it existed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<Value>,

    /// The local branch's value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local: Option<Value>,

    /// The remote branch's value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<Value>,

    /// Human-readable description.
    pub message: String,
}

/// Accumulates conflicts, honoring an optional cap.
///
/// When the cap is reached further conflicts are counted but not recorded,
/// so the merged document stays identical regardless of the cap.
#[derive(Debug, Default)]
pub struct ConflictSink {
    conflicts: Vec<Conflict>,
    cap: Option<usize>,
    truncated: bool,
}

impl ConflictSink {
    /// A sink recording at most `cap` conflicts (`None` = unbounded).
    #[must_use]
    pub fn with_cap(cap: Option<usize>) -> Self {
        Self {
            conflicts: Vec::new(),
            cap,
            truncated: false,
        }
    }

    /// Record a conflict, dropping it silently once the cap is reached.
    pub fn push(&mut self, conflict: Conflict) {
        if self.cap.is_some_and(|cap| self.conflicts.len() >= cap) {
            self.truncated = true;
            return;
        }
        self.conflicts.push(conflict);
    }

    /// Number of recorded conflicts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.conflicts.len()
    }

    /// Whether no conflicts were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conflicts.is_empty()
    }

    /// Whether the cap dropped any conflicts.
    #[must_use]
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    /// Consume the sink.
    #[must_use]
    pub fn into_parts(self) -> (Vec<Conflict>, bool) {
        (self.conflicts, self.truncated)
    }
}
