//! Transport-independent annotation API.
//!
//! `Annotator` is the single entry point for client operations. The HTTP
//! server calls these methods; it never reaches into the catalog, store or
//! cursor directly.

use crate::catalog::{Catalog, CatalogError, ClimbPosition, HoldId};
use crate::cursor::{CursorError, NavigationCursor, StartMode};
use crate::graph::{AnnotatedGraph, GraphBuilder};
use crate::storage::{EdgeInput, EdgeStore, StorageError, StoredEdge, UpsertSummary};
use serde::Serialize;
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

/// Errors surfaced by annotation operations
#[derive(Debug, Error)]
pub enum AnnotatorError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Cursor(#[from] CursorError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Invalid edge batch: {0}")]
    Validation(String),

    #[error("Cursor lock poisoned")]
    LockPoisoned,
}

pub type AnnotatorResult<T> = Result<T, AnnotatorError>;

/// Name and links for one climb
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClimbInfo {
    pub position: ClimbPosition,
    pub climb_name: String,
    pub links: Vec<String>,
}

/// Where the cursor stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CursorState {
    pub position: ClimbPosition,
    pub at_start: bool,
    pub at_end: bool,
}

pub struct Annotator {
    catalog: Arc<Catalog>,
    store: Arc<dyn EdgeStore>,
    cursor: Mutex<NavigationCursor>,
}

impl Annotator {
    /// Prepare the store and place the cursor according to `mode`
    pub fn open(
        catalog: Arc<Catalog>,
        store: Arc<dyn EdgeStore>,
        mode: StartMode,
    ) -> AnnotatorResult<Self> {
        store.ensure_schema()?;
        let persisted = store.max_position()?;
        let cursor = NavigationCursor::start(mode, catalog.len(), persisted)?;

        if let (StartMode::Zero, Some(saved)) = (mode, persisted) {
            if saved > 0 {
                tracing::warn!(saved, "start mode 'zero' ignores saved progress");
            }
        }
        tracing::info!(
            %mode,
            position = %cursor.position(),
            climbs = catalog.len(),
            "annotator ready"
        );

        Ok(Self {
            catalog,
            store,
            cursor: Mutex::new(cursor),
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    fn cursor(&self) -> AnnotatorResult<MutexGuard<'_, NavigationCursor>> {
        self.cursor.lock().map_err(|_| AnnotatorError::LockPoisoned)
    }

    // --- Cursor ---

    pub fn position(&self) -> AnnotatorResult<ClimbPosition> {
        Ok(self.cursor()?.position())
    }

    pub fn cursor_state(&self) -> AnnotatorResult<CursorState> {
        let cursor = self.cursor()?;
        Ok(CursorState {
            position: cursor.position(),
            at_start: cursor.at_start(),
            at_end: cursor.at_end(),
        })
    }

    pub fn next(&self) -> AnnotatorResult<ClimbPosition> {
        let position = self.cursor()?.next()?;
        tracing::info!(%position, "moved to next climb");
        Ok(position)
    }

    pub fn previous(&self) -> AnnotatorResult<ClimbPosition> {
        let position = self.cursor()?.previous()?;
        tracing::info!(%position, "moved to previous climb");
        Ok(position)
    }

    pub fn seek(&self, raw: i64) -> AnnotatorResult<ClimbPosition> {
        let position = self.catalog.position(raw)?;
        Ok(self.cursor()?.seek(position)?)
    }

    // --- Read ---

    /// Hold nodes for the current climb
    pub fn current_graph(&self) -> AnnotatorResult<AnnotatedGraph> {
        let position = self.position()?;
        Ok(GraphBuilder::new(&self.catalog).build(position)?)
    }

    /// Saved edges for the current climb
    pub fn current_edges(&self) -> AnnotatorResult<Vec<StoredEdge>> {
        let position = self.position()?;
        Ok(self.store.get_edges(position)?)
    }

    /// Name and external links for the climb at `raw`
    pub fn climb_info(&self, raw: i64) -> AnnotatorResult<ClimbInfo> {
        let position = self.catalog.position(raw)?;
        let climb_name = self
            .catalog
            .climb_name(position)
            .unwrap_or_default()
            .to_string();
        let links = self.catalog.links().resolve(&climb_name);
        Ok(ClimbInfo {
            position,
            climb_name,
            links,
        })
    }

    /// Every stored `(start, end)` pair
    pub fn export_all(&self) -> AnnotatorResult<Vec<(HoldId, HoldId)>> {
        Ok(self.store.get_all()?)
    }

    // --- Write ---

    /// Upsert a batch for the current climb
    pub fn save_edges(&self, edges: &[EdgeInput]) -> AnnotatorResult<UpsertSummary> {
        let position = self.position()?;
        let summary = self.store.upsert(position, edges, self.catalog.as_ref())?;
        tracing::info!(
            %position,
            inserted = summary.inserted,
            updated = summary.updated,
            "saved edges"
        );
        Ok(summary)
    }

    /// Upsert a batch drawn in the UI for the current climb.
    ///
    /// Entries without an index continue the climb's stored drawing order.
    pub fn save_drawn_edges(&self, edges: &[EdgeInput]) -> AnnotatorResult<UpsertSummary> {
        let position = self.position()?;
        let summary = self
            .store
            .upsert_in_drawing_order(position, edges, self.catalog.as_ref())?;
        tracing::info!(
            %position,
            inserted = summary.inserted,
            updated = summary.updated,
            "saved drawn edges"
        );
        Ok(summary)
    }

    /// Remove every edge for the current climb
    pub fn delete_current_edges(&self) -> AnnotatorResult<usize> {
        let position = self.position()?;
        self.delete_edges(position)
    }

    /// Remove every edge for the climb at `raw`
    pub fn delete_edges_at(&self, raw: i64) -> AnnotatorResult<usize> {
        let position = self.catalog.position(raw)?;
        self.delete_edges(position)
    }

    /// Remove every edge for an already validated position
    pub fn delete_edges(&self, position: ClimbPosition) -> AnnotatorResult<usize> {
        let removed = self.store.delete_all(position)?;
        tracing::info!(%position, removed, "deleted edges");
        Ok(removed)
    }
}

/// Parse a client edge batch.
///
/// Accepts `[start, end]`, `[start, end, index]` and
/// `{"start", "end", "index"}` entries; `index` may be null or absent.
pub fn parse_edge_batch(body: &Value) -> AnnotatorResult<Vec<EdgeInput>> {
    let entries = body
        .as_array()
        .ok_or_else(|| AnnotatorError::Validation("expected a JSON array of edges".into()))?;

    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| parse_edge(entry).map_err(|msg| AnnotatorError::Validation(format!("entry {i}: {msg}"))))
        .collect()
}

fn parse_edge(entry: &Value) -> Result<EdgeInput, String> {
    let (start, end, index) = match entry {
        Value::Array(items) => {
            if !(2..=3).contains(&items.len()) {
                return Err(format!("expected 2 or 3 elements, got {}", items.len()));
            }
            (Some(&items[0]), Some(&items[1]), items.get(2))
        }
        Value::Object(fields) => (fields.get("start"), fields.get("end"), fields.get("index")),
        _ => return Err("expected an array or object".into()),
    };

    let start = hold_id(start, "start")?;
    let end = hold_id(end, "end")?;
    let index = match index {
        None | Some(Value::Null) => None,
        Some(v) => Some(v.as_i64().ok_or_else(|| format!("'index' must be an integer, got {v}"))?),
    };

    Ok(EdgeInput { start, end, index })
}

fn hold_id(value: Option<&Value>, field: &str) -> Result<HoldId, String> {
    match value {
        None | Some(Value::Null) => Err(format!("missing '{field}'")),
        Some(v) => v
            .as_i64()
            .ok_or_else(|| format!("'{field}' must be an integer hold id, got {v}")),
    }
}
