//! # Budget Guard
//!
//! Enforces document growth limits so pathological inputs cannot exhaust
//! memory or stack. Each threshold covers one resource axis:
//!
//! | Threshold | Default | Axis |
//! |-----------|---------|------|
//! | `max_nodes` | 10 000 | total node count |
//! | `max_artboards` | 100 | top-level containers |
//! | `max_depth` | 50 | nesting depth |
//! | `max_memory_bytes` | 100 MB | estimated in-memory footprint |
//! | `op_deadline_ms` | 30 000 | wall time per operation |
//!
//! The memory estimate is deliberately crude (a flat cost per node); its
//! job is to catch runaway documents, not to model the allocator.
//!
//! Enforcement is asymmetric: read paths surface warnings and proceed,
//! write paths that would grow the document fail hard with
//! `BudgetExceeded` *before* any mutation happens.

use crate::error::OpError;
use easel_tree::{stats, TreeStats};
use easel_schema::Document;
use serde::{Deserialize, Serialize};

/// Budget thresholds. All fields have generous defaults; hosting tools can
/// tighten them per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetConfig {
    /// Maximum total node count.
    pub max_nodes: usize,

    /// Maximum artboard count.
    pub max_artboards: usize,

    /// Maximum nesting depth (0 = artboard children only).
    pub max_depth: usize,

    /// Estimated bytes per node for the memory heuristic.
    pub node_cost_bytes: usize,

    /// Maximum estimated in-memory footprint.
    pub max_memory_bytes: usize,

    /// Wall-time ceiling per operation, honored by deadline-aware callers.
    pub op_deadline_ms: u64,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            max_nodes: 10_000,
            max_artboards: 100,
            max_depth: 50,
            node_cost_bytes: 1024,
            max_memory_bytes: 100 * 1024 * 1024,
            op_deadline_ms: 30_000,
        }
    }
}

/// A non-fatal threshold crossing observed on a read path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum BudgetWarning {
    /// Node count at or over the limit.
    NodeCount { count: usize, limit: usize },

    /// Artboard count at or over the limit.
    ArtboardCount { count: usize, limit: usize },

    /// Nesting depth at or over the limit.
    Depth { depth: usize, limit: usize },

    /// Estimated memory at or over the limit.
    Memory { estimated: usize, limit: usize },
}

impl std::fmt::Display for BudgetWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NodeCount { count, limit } => {
                write!(f, "node count {count} exceeds budget of {limit}")
            }
            Self::ArtboardCount { count, limit } => {
                write!(f, "artboard count {count} exceeds budget of {limit}")
            }
            Self::Depth { depth, limit } => {
                write!(f, "nesting depth {depth} exceeds budget of {limit}")
            }
            Self::Memory { estimated, limit } => {
                write!(f, "estimated memory {estimated} bytes exceeds budget of {limit}")
            }
        }
    }
}

/// Check a document against the budget, collecting warnings.
///
/// Read paths call this and carry on; nothing fails.
#[must_use]
pub fn check_read(doc: &Document, config: &BudgetConfig) -> Vec<BudgetWarning> {
    collect(stats(doc), config)
}

/// Check a document against the budget before a growing write.
///
/// # Errors
///
/// [`OpError::BudgetExceeded`] naming the first crossed threshold.
pub fn check_write(doc: &Document, config: &BudgetConfig) -> Result<(), OpError> {
    match collect(stats(doc), config).into_iter().next() {
        Some(warning) => Err(OpError::BudgetExceeded {
            message: warning.to_string(),
        }),
        None => Ok(()),
    }
}

fn collect(stats: TreeStats, config: &BudgetConfig) -> Vec<BudgetWarning> {
    let mut out = Vec::new();
    if stats.node_count > config.max_nodes {
        out.push(BudgetWarning::NodeCount {
            count: stats.node_count,
            limit: config.max_nodes,
        });
    }
    if stats.artboard_count > config.max_artboards {
        out.push(BudgetWarning::ArtboardCount {
            count: stats.artboard_count,
            limit: config.max_artboards,
        });
    }
    if stats.max_depth > config.max_depth {
        out.push(BudgetWarning::Depth {
            depth: stats.max_depth,
            limit: config.max_depth,
        });
    }
    let estimated = stats.node_count.saturating_mul(config.node_cost_bytes);
    if estimated > config.max_memory_bytes {
        out.push(BudgetWarning::Memory {
            estimated,
            limit: config.max_memory_bytes,
        });
    }
    out
}
