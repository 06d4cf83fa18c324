//! # Easel Merge
//!
//! Three-way structural merge over canvas documents: given a common
//! ancestor and two concurrently edited descendants, produce a merged
//! document plus a classified conflict report.
//!
//! ```text
//!                 base
//!                /    \
//!           local      remote
//!                \    /
//!          merge(base, local, remote)
//!                  │
//!   { merged, patches_from_base, conflicts }
//! ```
//!
//! ## Model
//!
//! Nodes in different branches *correspond* when they share a semantic key,
//! or, lacking one, an identifier. Correspondence is computed once up
//! front by indexing all three trees; the merge then walks corresponding
//! container slots, merging fields independently and reconciling child
//! order.
//!
//! ## Conflict policy
//!
//! The merged document is always produced, even in the presence of
//! conflicts; each conflict carries a stable code, the node involved, the
//! three versions of the disputed value, and a human message. The caller
//! picks a resolution policy; the only asymmetry between the branches is
//! the tie-break side (local by default).
//!
//! | Code | Class | Meaning |
//! |------|-------|---------|
//! | `P-001` | property | both sides changed a field to different values |
//! | `S-001` | structural | one side edited a node the other deleted |
//! | `S-002` | structural | irreconcilable child reordering |
//! | `C-001` | content | both sides added the same identity with different content |
//!
//! ## Guarantees
//!
//! Merge is deterministic (identical inputs produce identical bytes),
//! commutative up to the tie-break side, idempotent
//! (`merge(b, x, x) == x` with no conflicts), and invariant-preserving:
//! the result is schema-valid or the merge aborts without leaking a
//! partial document.

mod children;
mod conflict;
mod error;
mod fields;
mod index;
mod merge;

pub use conflict::{Conflict, ConflictCode, ConflictSink};
pub use error::MergeError;
pub use index::MergeKey;
pub use merge::{merge, MergeOptions, MergeOutcome, Resolution};

/// Result type alias for merge operations.
pub type Result<T> = std::result::Result<T, MergeError>;
