//! Error types for the schema layer.

use thiserror::Error;

/// A single validation failure, addressed by JSON Pointer.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Violation {
    /// JSON Pointer to the offending value (`/artboards/0/children/2/frame`).
    pub pointer: String,

    /// Human-readable description of the failure.
    pub message: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.pointer, self.message)
    }
}

/// Errors from identifier parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IdError {
    /// Input was not exactly 26 characters.
    #[error("identifier must be 26 characters, got {length}")]
    InvalidLength {
        /// Actual input length.
        length: usize,
    },

    /// Input contained a character outside the Crockford base32 alphabet.
    #[error("invalid identifier character '{ch}' at index {index}")]
    InvalidChar {
        /// The offending character.
        ch: char,
        /// Zero-based position in the input.
        index: usize,
    },
}

/// Errors from schema validation, parsing, and migration.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The document violates one or more structural constraints.
    ///
    /// Every violation is collected before returning; validation never stops
    /// at the first failure.
    #[error("document failed validation with {} violation(s)", violations.len())]
    Invalid {
        /// All detected violations, in document order.
        violations: Vec<Violation>,
    },

    /// The document's version could not be recognized.
    #[error("unknown document version {version:?}")]
    UnknownVersion {
        /// The declared version, if any was found.
        version: Option<String>,
    },

    /// No composable chain of migrations connects the two versions.
    #[error("no migration path from {from} to {to}")]
    NoMigrationPath {
        /// Detected source version.
        from: String,
        /// Requested target version.
        to: String,
    },

    /// The input bytes were not well-formed JSON for the document shape.
    #[error("malformed document: {0}")]
    Json(#[from] serde_json::Error),

    /// An identifier failed to parse.
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] IdError),
}
