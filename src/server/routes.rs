//! Request handlers

use super::errors::ApiError;
use super::AppState;
use crate::annotator::{parse_edge_batch, Annotator, AnnotatorError, AnnotatorResult};
use crate::storage::StorageError;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};
use std::time::Instant;

/// Run a read-only annotator call off the async runtime, bounded by the
/// configured request timeout. An abandoned read leaves nothing behind.
async fn read<T, F>(state: &AppState, op: F) -> Result<T, ApiError>
where
    F: FnOnce(&Annotator) -> AnnotatorResult<T> + Send + 'static,
    T: Send + 'static,
{
    let annotator = state.annotator.clone();
    let task = tokio::task::spawn_blocking(move || op(&annotator));

    match tokio::time::timeout(state.request_timeout, task).await {
        Ok(Ok(result)) => result.map_err(ApiError::from),
        Ok(Err(join)) => Err(ApiError::Internal(join.to_string())),
        Err(_) => Err(ApiError::from(AnnotatorError::Storage(StorageError::Timeout(
            state.request_timeout,
        )))),
    }
}

/// Run a state-changing annotator call off the async runtime and wait for
/// its real outcome.
///
/// A blocking task cannot be cancelled, so replying early could report a
/// failure for a write that later commits. Store stalls are bounded by the
/// SQLite busy timeout instead; overruns are only logged.
async fn write<T, F>(state: &AppState, op: F) -> Result<T, ApiError>
where
    F: FnOnce(&Annotator) -> AnnotatorResult<T> + Send + 'static,
    T: Send + 'static,
{
    let annotator = state.annotator.clone();
    let started = Instant::now();
    let outcome = tokio::task::spawn_blocking(move || op(&annotator)).await;

    let elapsed = started.elapsed();
    if elapsed > state.request_timeout {
        tracing::warn!(?elapsed, limit = ?state.request_timeout, "write overran the request timeout");
    }

    match outcome {
        Ok(result) => result.map_err(ApiError::from),
        Err(join) => Err(ApiError::Internal(join.to_string())),
    }
}

/// GET /graph
pub async fn get_graph(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let graph = read(&state, |a| a.current_graph()).await?;
    Ok(Json(json!({
        "nodes": graph.nodes,
        "edges": [],
        "graph_index": graph.position,
    })))
}

/// GET /getEdges
pub async fn get_edges(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let edges = read(&state, |a| a.current_edges()).await?;
    Ok(Json(json!({ "edges": edges })))
}

/// POST /saveEdges
///
/// Entries without an index continue the climb's stored drawing order.
pub async fn save_edges(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>, ApiError> {
    let value: Value = serde_json::from_slice(&body)
        .map_err(|e| AnnotatorError::Validation(format!("body is not valid JSON: {e}")))?;
    let edges = parse_edge_batch(&value)?;

    write(&state, move |a| a.save_drawn_edges(&edges)).await?;
    Ok(Json(json!({ "success": true })))
}

/// DELETE /deleteAllEdges
pub async fn delete_all_edges(State(state): State<AppState>) -> impl IntoResponse {
    let result = write(&state, |a| {
        let position = a.position()?;
        let removed = a.delete_edges(position)?;
        Ok((position, removed))
    })
    .await;

    match result {
        Ok((position, removed)) => (
            StatusCode::OK,
            Json(json!({ "message": format!("Deleted {removed} edges for climb {position}") })),
        ),
        Err(err) => {
            tracing::error!(error = %err, "failed to delete edges");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": format!("Failed to delete edges: {err}") })),
            )
        }
    }
}

/// GET /next
pub async fn next(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let position = write(&state, |a| a.next()).await?;
    Ok(Json(json!({ "success": true, "graph_index": position })))
}

/// GET /previous
pub async fn previous(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let position = write(&state, |a| a.previous()).await?;
    Ok(Json(json!({ "success": true, "graph_index": position })))
}

/// GET /climbName/:position
pub async fn climb_name(
    State(state): State<AppState>,
    Path(position): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let info = read(&state, move |a| a.climb_info(position)).await?;
    Ok(Json(json!({ "climb_name": info.climb_name, "links": info.links })))
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let cursor = read(&state, |a| a.cursor_state()).await?;
    Ok(Json(json!({
        "status": "UP",
        "version": env!("CARGO_PKG_VERSION"),
        "position": cursor.position,
        "at_start": cursor.at_start,
        "at_end": cursor.at_end,
        "climbs": state.annotator.catalog().len(),
    })))
}
