//! # Easel Tree
//!
//! Read-only structure queries over canvas documents: typed node paths,
//! lazy pre-order traversal, find helpers, and point hit testing.
//!
//! Everything in this crate borrows the document immutably and allocates
//! only for paths and result lists. Traversal uses explicit stacks rather
//! than recursion, so adversarially deep documents exhaust the depth budget
//! upstream instead of the call stack here.
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | `path` | `NodePath`: route from document root to a node |
//! | `walk` | Pre-order iterator, find helpers, tree statistics |
//! | `hittest` | Point → node resolution in z-order |

mod error;
mod hittest;
mod path;
mod walk;

pub use error::TreeError;
pub use hittest::{hit_test, HitResult, Point};
pub use path::NodePath;
pub use walk::{
    ancestors, count_nodes, descendants, find_by_id, find_by_name, find_by_semantic_key,
    find_by_type, find_path_by_id, stats, walk, TreeStats, Visit, Walk, WalkConfig,
};

/// Result type alias for tree operations.
pub type Result<T> = std::result::Result<T, TreeError>;
