//! # Easel Core
//!
//! Unified facade over the canvas document engine. Hosting tools talk to
//! [`Engine`]; the component crates below it stay composable on their own.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        EASEL CORE                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │                                                             │
//! │                    ┌───────────────┐                        │
//! │                    │    Engine     │  ← Unified Facade      │
//! │                    └───────┬───────┘                        │
//! │                            │                                │
//! │      ┌──────────┬──────────┼──────────┬──────────┐          │
//! │      ▼          ▼          ▼          ▼          ▼          │
//! │ ┌─────────┐ ┌────────┐ ┌────────┐ ┌────────┐ ┌─────────┐   │
//! │ │ Schema  │ │  Tree  │ │  Ops   │ │ Merge  │ │ Budget  │   │
//! │ │ +Canon  │ │ +Hits  │ │+Patch  │ │+Confl. │ │ Guard   │   │
//! │ └─────────┘ └────────┘ └────────┘ └────────┘ └─────────┘   │
//! │                                                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Layering
//!
//! | Layer | Crate | Responsibility |
//! |-------|-------|----------------|
//! | L0–L1 | `easel-schema` | identifiers, canonical bytes, model, validation, migration |
//! | L2 | `easel-tree` | paths, traversal, hit testing |
//! | L3 | `easel-ops` | patches, node operations, budget guard |
//! | L4 | `easel-merge` | three-way merge, conflict classification |
//!
//! Control flow is strictly bottom-up; there are no cycles and no global
//! state (the identifier generator's monotonic register aside). Documents
//! are immutable values: every operation returns a new document plus the
//! forward and inverse patch sequences that connect the two.
//!
//! ## Usage
//!
//! ```rust
//! use easel_core::{Engine, EngineConfig};
//! use easel_ops::NewNode;
//! use easel_tree::NodePath;
//!
//! let engine = Engine::new(EngineConfig::default());
//! let doc = easel_schema::Document::new("Landing page");
//!
//! let outcome = engine
//!     .create(&doc, &NodePath::artboard_root(0), NewNode::frame(), None)
//!     .unwrap();
//! assert_eq!(outcome.document.artboards[0].children.len(), 1);
//!
//! // The original value is untouched; undo is just the inverse patches.
//! assert!(doc.artboards[0].children.is_empty());
//! ```
//!
//! ## Error contract
//!
//! Every failure is a value with a stable machine-checkable code (see
//! [`EngineError::code`]); `to_wire` renders the
//! `{ code, message, path?, details? }` shape external tools consume.
//! Observer hooks may fire on error paths but never change outcomes.

mod config;
mod engine;
mod error;
mod observer;

pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{EngineError, WireError};
pub use observer::{EngineEvent, EngineObserver, NoopObserver, OpKind};

// Re-export component types for convenience.
pub use easel_merge::{Conflict, ConflictCode, MergeOptions, MergeOutcome, Resolution};
pub use easel_ops::{BudgetConfig, BudgetWarning, NewNode, OpOutcome, PatchOp};
pub use easel_schema::{Document, NodeId, Violation, CURRENT_SCHEMA_VERSION};
pub use easel_tree::{HitResult, NodePath, Point, TreeStats};

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
