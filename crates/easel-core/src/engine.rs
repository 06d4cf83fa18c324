//! The unified engine facade.
//!
//! [`Engine`] bundles configuration and the observer handle; everything
//! else is delegation. The facade owns two cross-cutting concerns the
//! component crates stay free of: budget enforcement on growing writes,
//! and event emission around entry points.

use crate::{
    config::EngineConfig,
    error::EngineError,
    observer::{EngineEvent, EngineObserver, NoopObserver, OpKind},
    Result,
};

use easel_merge::{MergeOptions, MergeOutcome};
use easel_ops::{BudgetWarning, NewNode, OpOutcome};
use easel_schema::{
    canonical, check_compatibility, migrate_to_current, repair, validate, CompatReport, Document,
    NodeId,
};
use easel_tree::{hit_test, stats, HitResult, NodePath, Point, TreeStats};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// The unified canvas engine facade.
///
/// Purely functional: every method consumes an immutable document value and
/// returns a new one (or a read-only answer). The engine holds no document
/// state, so one `Engine` can serve any number of documents and threads.
///
/// # Example
///
/// ```rust
/// use easel_core::{Engine, EngineConfig};
///
/// let engine = Engine::new(EngineConfig::default());
/// let doc = easel_schema::Document::new("Spec");
/// let bytes = engine.serialize(&doc).unwrap();
/// assert_eq!(engine.parse(&bytes).unwrap(), doc);
/// ```
pub struct Engine {
    /// Configuration.
    config: EngineConfig,

    /// Observer handle for timing events.
    observer: Arc<dyn EngineObserver>,
}

impl Engine {
    /// Create an engine with the given configuration and no observer.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self::with_observer(config, Arc::new(NoopObserver))
    }

    /// Create an engine with a caller-supplied observer.
    #[must_use]
    pub fn with_observer(config: EngineConfig, observer: Arc<dyn EngineObserver>) -> Self {
        info!(
            max_nodes = config.budget.max_nodes,
            max_depth = config.budget.max_depth,
            "engine initialized"
        );
        Self { config, observer }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // =========================================================================
    // Serialization boundary
    // =========================================================================

    /// Parse and validate a document from canonical (or any) JSON bytes.
    ///
    /// # Errors
    ///
    /// `InvalidSchema` for malformed or invalid input.
    pub fn parse(&self, bytes: &[u8]) -> Result<Document> {
        let doc = canonical::parse_document(bytes)?;
        for warning in self.budget_warnings(&doc) {
            warn!(%warning, "document over budget");
        }
        Ok(doc)
    }

    /// Parse with repair: fill safe defaults before validating.
    ///
    /// # Errors
    ///
    /// `InvalidSchema` when the document is broken beyond repair's remit.
    pub fn parse_with_repair(&self, bytes: &[u8]) -> Result<Document> {
        let raw: Value = serde_json::from_slice(bytes).map_err(easel_schema::SchemaError::from)?;
        let repaired = repair(&raw);
        let doc: Document =
            serde_json::from_value(repaired).map_err(easel_schema::SchemaError::from)?;
        validate(&doc)?;
        Ok(doc)
    }

    /// Canonical bytes for a document. The only sanctioned output path.
    ///
    /// # Errors
    ///
    /// `InvalidSchema` (practically unreachable for well-formed values).
    pub fn serialize(&self, doc: &Document) -> Result<Vec<u8>> {
        Ok(canonical::serialize_document(doc)?)
    }

    /// SHA-256 digest over canonical bytes.
    ///
    /// # Errors
    ///
    /// As [`Engine::serialize`].
    pub fn hash(&self, doc: &Document) -> Result<[u8; 32]> {
        Ok(canonical::hash_document(doc)?)
    }

    /// Hex rendering of [`Engine::hash`].
    ///
    /// # Errors
    ///
    /// As [`Engine::serialize`].
    pub fn hash_hex(&self, doc: &Document) -> Result<String> {
        Ok(canonical::hash_hex(doc)?)
    }

    // =========================================================================
    // Versioning
    // =========================================================================

    /// Report whether and how a raw document can reach the current version.
    #[must_use]
    pub fn check_compatibility(&self, raw: &Value) -> CompatReport {
        check_compatibility(raw)
    }

    /// Migrate a raw document to the current version.
    ///
    /// # Errors
    ///
    /// `UnknownVersion`, `NoMigrationPath`, or `InvalidSchema`.
    pub fn migrate(&self, raw: &Value) -> Result<Document> {
        let doc = migrate_to_current(raw)?;
        info!(artboards = doc.artboards.len(), "document migrated");
        Ok(doc)
    }

    // =========================================================================
    // Read paths
    // =========================================================================

    /// Tree statistics for a document.
    #[must_use]
    pub fn stats(&self, doc: &Document) -> TreeStats {
        stats(doc)
    }

    /// Budget warnings for a document (read paths never fail on budget).
    #[must_use]
    pub fn budget_warnings(&self, doc: &Document) -> Vec<BudgetWarning> {
        easel_ops::check_read(doc, &self.config.budget)
    }

    /// All visible nodes under a point, topmost first.
    #[must_use]
    pub fn hit_test(&self, doc: &Document, point: Point) -> Vec<HitResult> {
        hit_test(doc, point)
    }

    // =========================================================================
    // Node operations
    // =========================================================================

    /// Create a node under `parent_path`.
    ///
    /// # Errors
    ///
    /// `BudgetExceeded`, `PathNotFound`, `ParentNotContainer`,
    /// `InvalidValue`.
    pub fn create(
        &self,
        doc: &Document,
        parent_path: &NodePath,
        spec: NewNode,
        index: Option<usize>,
    ) -> Result<OpOutcome> {
        self.run_op(OpKind::Create, || {
            easel_ops::check_write(doc, &self.config.budget)?;
            Ok(easel_ops::create(doc, parent_path, spec, index)?)
        })
    }

    /// Shallow-merge field updates into a node.
    ///
    /// # Errors
    ///
    /// `NodeNotFound`, `TypeChangeDisallowed`, `InvalidValue`.
    pub fn update(
        &self,
        doc: &Document,
        id: NodeId,
        updates: &Map<String, Value>,
    ) -> Result<OpOutcome> {
        self.run_op(OpKind::Update, || Ok(easel_ops::update(doc, id, updates)?))
    }

    /// Delete a node and its subtree.
    ///
    /// # Errors
    ///
    /// `NodeNotFound`, `RootDeletionDisallowed`.
    pub fn delete(&self, doc: &Document, id: NodeId) -> Result<OpOutcome> {
        self.run_op(OpKind::Delete, || Ok(easel_ops::delete(doc, id)?))
    }

    /// Move a node under a new parent.
    ///
    /// # Errors
    ///
    /// `NodeNotFound`, `TargetNotContainer`, `WouldCreateCycle`.
    pub fn move_node(
        &self,
        doc: &Document,
        id: NodeId,
        new_parent_path: &NodePath,
        index: usize,
    ) -> Result<OpOutcome> {
        self.run_op(OpKind::Move, || {
            Ok(easel_ops::move_node(doc, id, new_parent_path, index)?)
        })
    }

    /// Duplicate a subtree, fresh identifiers throughout.
    ///
    /// # Errors
    ///
    /// `BudgetExceeded`, `NodeNotFound`.
    pub fn duplicate(&self, doc: &Document, id: NodeId) -> Result<OpOutcome> {
        self.run_op(OpKind::Duplicate, || {
            easel_ops::check_write(doc, &self.config.budget)?;
            Ok(easel_ops::duplicate(doc, id)?)
        })
    }

    // =========================================================================
    // Merge
    // =========================================================================

    /// Three-way merge; `options` defaults to the configured merge options.
    ///
    /// # Errors
    ///
    /// `InvalidSchema`, `BudgetExceeded`, `MergeAborted`, `Cancelled`.
    pub fn merge(
        &self,
        base: &Document,
        local: &Document,
        remote: &Document,
        options: Option<MergeOptions>,
    ) -> Result<MergeOutcome> {
        let options = options.unwrap_or(self.config.merge);
        let start = Instant::now();
        self.observer.on_event(&EngineEvent::MergeStarted);

        match easel_merge::merge(base, local, remote, options) {
            Ok(outcome) => {
                debug!(
                    conflicts = outcome.conflicts.len(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "merge completed"
                );
                self.observer.on_event(&EngineEvent::MergeCompleted {
                    duration: start.elapsed(),
                    conflict_count: outcome.conflicts.len(),
                });
                Ok(outcome)
            }
            Err(err) => {
                let err: EngineError = err.into();
                warn!(code = err.code(), "merge failed");
                self.observer.on_event(&EngineEvent::MergeFailed {
                    duration: start.elapsed(),
                    code: err.code(),
                });
                Err(err)
            }
        }
    }

    /// Run one node operation with event emission and timing.
    fn run_op(&self, op: OpKind, f: impl FnOnce() -> Result<OpOutcome>) -> Result<OpOutcome> {
        let start = Instant::now();
        self.observer.on_event(&EngineEvent::OpStarted { op });

        match f() {
            Ok(outcome) => {
                debug!(
                    %op,
                    patches = outcome.patches.len(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "operation completed"
                );
                self.observer.on_event(&EngineEvent::OpCompleted {
                    op,
                    duration: start.elapsed(),
                    patch_count: outcome.patches.len(),
                });
                Ok(outcome)
            }
            Err(err) => {
                warn!(%op, code = err.code(), "operation failed");
                self.observer.on_event(&EngineEvent::OpFailed {
                    op,
                    duration: start.elapsed(),
                    code: err.code(),
                });
                Err(err)
            }
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
