//! Storage trait definitions

use crate::catalog::{Catalog, ClimbPosition, HoldId};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No climb name for position {0}")]
    UnknownPosition(ClimbPosition),

    #[error("Storage call did not finish within {0:?}")]
    Timeout(Duration),

    #[error("Storage connection lock poisoned")]
    LockPoisoned,
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// One edge as drawn by the annotator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeInput {
    pub start: HoldId,
    pub end: HoldId,
    /// Ordinal in the drawn sequence, if assigned
    #[serde(default)]
    pub index: Option<i64>,
}

impl EdgeInput {
    pub fn new(start: HoldId, end: HoldId) -> Self {
        Self {
            start,
            end,
            index: None,
        }
    }

    pub fn with_index(mut self, index: i64) -> Self {
        self.index = Some(index);
        self
    }
}

/// A persisted edge; serializes as `[start, end, edge_index]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "(HoldId, HoldId, Option<i64>)")]
pub struct StoredEdge {
    pub start: HoldId,
    pub end: HoldId,
    pub edge_index: Option<i64>,
}

impl From<StoredEdge> for (HoldId, HoldId, Option<i64>) {
    fn from(edge: StoredEdge) -> Self {
        (edge.start, edge.end, edge.edge_index)
    }
}

/// Row counts from one upsert batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UpsertSummary {
    pub inserted: usize,
    pub updated: usize,
}

/// Resolves the display name written onto new edge rows
pub trait ClimbNames {
    fn climb_name(&self, position: ClimbPosition) -> Option<String>;
}

impl ClimbNames for Catalog {
    fn climb_name(&self, position: ClimbPosition) -> Option<String> {
        Catalog::climb_name(self, position).map(str::to_string)
    }
}

/// Durable edge storage keyed by `(position, start, end)`.
///
/// Implementations must be thread-safe (Send + Sync); the server calls
/// them from blocking worker threads.
pub trait EdgeStore: Send + Sync {
    /// Create the edge table and bring older layouts up to date. Idempotent.
    fn ensure_schema(&self) -> StorageResult<()>;

    /// Insert new edges and update `edge_index` on existing ones.
    ///
    /// The batch commits as a whole or not at all. Rows that already exist
    /// keep their name and node ids.
    fn upsert(
        &self,
        position: ClimbPosition,
        edges: &[EdgeInput],
        names: &dyn ClimbNames,
    ) -> StorageResult<UpsertSummary>;

    /// Like [`upsert`](EdgeStore::upsert), but entries without an index are
    /// numbered after every ordinal already stored for the position and
    /// after any explicit index earlier in the batch.
    ///
    /// Numbering and writes share one transaction.
    fn upsert_in_drawing_order(
        &self,
        position: ClimbPosition,
        edges: &[EdgeInput],
        names: &dyn ClimbNames,
    ) -> StorageResult<UpsertSummary>;

    /// Edges for one position, ordered by `edge_index` (unassigned last),
    /// then by insertion order
    fn get_edges(&self, position: ClimbPosition) -> StorageResult<Vec<StoredEdge>>;

    /// Every stored `(start, end)` pair across all positions
    fn get_all(&self) -> StorageResult<Vec<(HoldId, HoldId)>>;

    /// Remove all edges for one position, returning how many went
    fn delete_all(&self, position: ClimbPosition) -> StorageResult<usize>;

    /// Largest position that has any stored edge
    fn max_position(&self) -> StorageResult<Option<i64>>;
}

/// Extension trait for opening stores from paths
pub trait OpenStore: EdgeStore + Sized {
    /// Open or create a store at the given path
    fn open(path: impl AsRef<Path>) -> StorageResult<Self>;

    /// Create an in-memory store (useful for testing)
    fn open_in_memory() -> StorageResult<Self>;
}
