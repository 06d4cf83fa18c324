//! # Easel Schema
//!
//! The document model for the Easel canvas engine: typed schema, stable
//! identifiers, canonical serialization, validation, and version migration.
//!
//! Everything above this crate (traversal, operations, merge) treats the
//! types defined here as immutable values. A mutation never edits a document
//! in place; it produces a new value, which is why canonical byte equality
//! can stand in for structural equality everywhere.
//!
//! ## Components
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | `ident` | 26-character sortable identifiers (Crockford base32) |
//! | `canonical` | Deterministic JSON encoding and SHA-256 hashing |
//! | `model` | Document / Artboard / Node types (tagged unions) |
//! | `validate` | Structural validation and bounded repair |
//! | `migrate` | Version detection and stepwise upgrades |
//!
//! ## Canonical form
//!
//! Two structurally equal documents serialize to identical bytes: object
//! keys are sorted, optional fields are omitted rather than set to `null`,
//! and numbers are written in shortest round-trip form. The canonical
//! serializer is the only sanctioned output path for persistence and
//! hashing.
//!
//! ## Example
//!
//! ```rust
//! use easel_schema::{canonical, Document};
//!
//! let doc = Document::new("Landing page");
//! let bytes = canonical::serialize_document(&doc).unwrap();
//! let parsed = canonical::parse_document(&bytes).unwrap();
//! assert_eq!(doc, parsed);
//! ```

pub mod canonical;
mod error;
mod ident;
mod migrate;
mod model;
mod validate;

pub use error::{IdError, SchemaError, Violation};
pub use ident::NodeId;
pub use migrate::{
    check_compatibility, detect_version, migrate, migrate_to_current, CompatReport,
    SUPPORTED_VERSIONS,
};
pub use model::{
    Artboard, ColorStop, Document, Fill, LayoutHints, Node, NodeBody, NodeKind, Rect, Shadow,
    Stroke, Style, TextStyle, CURRENT_SCHEMA_VERSION,
};
pub use validate::{repair, validate, validate_collect};

/// Result type alias for schema operations.
pub type Result<T> = std::result::Result<T, SchemaError>;
