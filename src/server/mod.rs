//! HTTP server exposing the annotator to the drawing UI.
//!
//! Routes: /graph, /getEdges, /saveEdges, /deleteAllEdges, /next,
//! /previous, /climbName/:position and /health.

mod errors;
mod routes;

pub use errors::ApiError;

use crate::annotator::{Annotator, AnnotatorError};
use crate::catalog::{Catalog, CatalogError};
use crate::config::ServerConfig;
use crate::storage::{OpenStore, SqliteEdgeStore, StorageError};
use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tower_http::trace::TraceLayer;

/// Failures while starting or running the server
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to load catalog: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Failed to open database: {0}")]
    Storage(#[from] StorageError),

    #[error("Failed to start annotator: {0}")]
    Annotator(#[from] AnnotatorError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub annotator: Arc<Annotator>,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(annotator: Arc<Annotator>, request_timeout: Duration) -> Self {
        Self {
            annotator,
            request_timeout,
        }
    }
}

/// Build the router over an already opened annotator
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/graph", get(routes::get_graph))
        .route("/getEdges", get(routes::get_edges))
        .route("/saveEdges", post(routes::save_edges))
        .route("/deleteAllEdges", delete(routes::delete_all_edges))
        .route("/next", get(routes::next))
        .route("/previous", get(routes::previous))
        .route("/climbName/:position", get(routes::climb_name))
        .route("/health", get(routes::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Load the catalog, open the database and place the cursor
pub fn open_annotator(config: &ServerConfig) -> Result<Annotator, ServerError> {
    let catalog = Catalog::load(&config.catalog_path)?;
    let store = SqliteEdgeStore::open(&config.db_path)?.with_busy_timeout(config.busy_timeout())?;
    tracing::info!(db = %config.db_path.display(), "opened edge store");

    Ok(Annotator::open(
        Arc::new(catalog),
        Arc::new(store),
        config.start_mode,
    )?)
}

/// Serve until ctrl-c
pub async fn serve(config: ServerConfig) -> Result<(), ServerError> {
    let annotator = Arc::new(open_annotator(&config)?);
    let app = router(AppState::new(annotator, config.request_timeout()));

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "could not listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}

/// Run the server on a single-threaded runtime, returning a process exit code
pub fn run_server(config: ServerConfig) -> i32 {
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("failed to create tokio runtime: {}", e);
            return 1;
        }
    };

    rt.block_on(async {
        match serve(config).await {
            Ok(()) => 0,
            Err(e) => {
                tracing::error!(error = %e, "server exited with error");
                eprintln!("Error: {}", e);
                1
            }
        }
    })
}
