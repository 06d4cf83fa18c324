//! # Easel Ops
//!
//! The mutation layer of the canvas engine. Documents are immutable values;
//! every change is expressed as a JSON-Patch sequence, and every operation
//! returns the new document together with the forward patches and their
//! exact inverse:
//!
//! ```text
//!   immutable document ──operation──▶ (document', patches, inverse)
//! ```
//!
//! Operations compute their patch sequence first and then *derive* the new
//! document by applying it, so the patches and the returned document cannot
//! drift apart. Applying `patches` to the old document always yields the
//! new one; applying `inverse` to the new document always restores the old
//! one, byte-for-byte in canonical form.
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | `patch` | RFC 6902 operation model, RFC 6901 pointers |
//! | `apply` | Strict patch application and inversion |
//! | `diff` | Deterministic structural diff between values |
//! | `budget` | Document growth thresholds |
//! | `ops` | create / update / delete / move / duplicate |

mod apply;
mod budget;
mod diff;
mod error;
mod ops;
mod patch;

pub use apply::{apply, invert};
pub use budget::{check_read, check_write, BudgetConfig, BudgetWarning};
pub use diff::diff;
pub use error::{OpError, PatchError};
pub use ops::{create, delete, duplicate, move_node, update, NewNode, OpOutcome};
pub use patch::{escape_token, parse_pointer, PatchOp};

/// Result type alias for operations.
pub type Result<T> = std::result::Result<T, OpError>;
