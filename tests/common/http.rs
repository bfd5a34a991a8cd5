//! Drive the router in-process

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use holdgraph::server::{router, AppState};
use holdgraph::Annotator;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

pub fn app(annotator: Arc<Annotator>) -> Router {
    app_with_timeout(annotator, Duration::from_secs(5))
}

pub fn app_with_timeout(annotator: Arc<Annotator>, request_timeout: Duration) -> Router {
    router(AppState::new(annotator, request_timeout))
}

/// Send one request and decode the JSON response body
pub async fn send(app: &Router, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header("content-type", "application/json");
    }
    let request = builder
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}
