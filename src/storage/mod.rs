//! Edge storage backends
//!
//! Edges are stored through the `EdgeStore` trait. The primary
//! implementation is `SqliteEdgeStore` for persistent storage.

mod sqlite;
mod traits;

pub use sqlite::{SqliteEdgeStore, DEFAULT_BUSY_TIMEOUT};
pub use traits::{
    ClimbNames, EdgeInput, EdgeStore, OpenStore, StorageError, StorageResult, StoredEdge,
    UpsertSummary,
};
