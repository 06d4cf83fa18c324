//! Error types for the merge engine.

use easel_schema::SchemaError;
use thiserror::Error;

/// Errors that abort a merge. No partial document ever escapes: the merge
/// either returns a complete outcome or one of these.
#[derive(Debug, Error)]
pub enum MergeError {
    /// An input document failed validation before merging started.
    #[error("{side} document failed validation: {source}")]
    InvalidSchema {
        /// Which input: `base`, `local`, or `remote`.
        side: &'static str,
        /// The underlying validation failure.
        #[source]
        source: SchemaError,
    },

    /// An input exceeded the depth budget that bounds merge recursion.
    #[error("budget exceeded: {message}")]
    BudgetExceeded {
        /// Which threshold, with observed and allowed values.
        message: String,
    },

    /// An engine invariant broke mid-merge. This is a bug, not bad input;
    /// the message carries diagnostic context.
    #[error("merge aborted: {message}")]
    Aborted {
        /// Diagnostic context for the invariant violation.
        message: String,
    },

    /// The caller-supplied deadline expired.
    #[error("merge cancelled: deadline expired")]
    Cancelled,
}
