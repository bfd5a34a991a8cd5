//! Holdgraph: climbing-route edge annotation
//!
//! Steps an annotator through a fixed, ordered list of climbs, shows each
//! climb's holds as an unconnected node graph and stores the directed
//! edges drawn between them.
//!
//! # Core Concepts
//!
//! - **Catalog**: read-only climbs, hold features and external links
//! - **Cursor**: the climb currently being annotated, bounded by the catalog
//! - **Edges**: drawn connections keyed by `(position, start, end)`, upserted
//!   into SQLite with an optional ordinal in the drawing sequence
//!
//! # Example
//!
//! ```
//! use holdgraph::{Annotator, Catalog, ClimbRecord, LinkResolver, OpenStore, SqliteEdgeStore, StartMode};
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! let catalog = Catalog::new(vec![ClimbRecord::new("Warmup")], HashMap::new(), LinkResolver::default()).unwrap();
//! let store = SqliteEdgeStore::open_in_memory().unwrap();
//! let annotator = Annotator::open(Arc::new(catalog), Arc::new(store), StartMode::Resume).unwrap();
//! assert_eq!(annotator.position().unwrap().index(), 0);
//! ```

pub mod annotator;
pub mod catalog;
pub mod config;
pub mod cursor;
pub mod graph;
pub mod server;
pub mod storage;

pub use annotator::{Annotator, AnnotatorError, AnnotatorResult, ClimbInfo, CursorState};
pub use catalog::{
    Catalog, CatalogError, CatalogResult, ClimbPosition, ClimbRecord, HoldId, LinkEntry,
    LinkResolver, NodeFeatures,
};
pub use config::ServerConfig;
pub use cursor::{CursorError, Direction, NavigationCursor, StartMode};
pub use graph::{AnnotatedGraph, GraphBuilder, HoldNode};
pub use storage::{
    ClimbNames, EdgeInput, EdgeStore, OpenStore, SqliteEdgeStore, StorageError, StorageResult,
    StoredEdge, UpsertSummary,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
