//! Lane layout for a commit graph.
//!
//! Commits arrive one row at a time, children before parents. Each row gets a
//! lane, plus the sets of lanes that pass through it, fork off at it, or merge
//! in at it. The renderer works from those sets alone.

/// Single-pass driver that turns ordered commits into graph rows.
pub mod builder;
/// Pure classification of a row's lanes.
pub mod classify;
mod commit;
mod error;
mod lane;
mod node;
mod pool;

pub use builder::{GraphBuilder, GraphPass, layout};
pub use commit::{Commit, CommitId, SHORT_ID_LEN};
pub use error::{GraphError, MalformedReason};
pub use lane::{DEFAULT_PALETTE_SIZE, Lane};
pub use node::{GraphLog, GraphNode};
pub use pool::LanePool;
