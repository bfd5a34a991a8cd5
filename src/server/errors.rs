//! Error responses for the HTTP API

use crate::annotator::AnnotatorError;
use crate::catalog::CatalogError;
use crate::cursor::CursorError;
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// Any failure a handler can return.
///
/// Bodies are `{"success": false, "error": "..."}`.
#[derive(Debug)]
pub enum ApiError {
    Annotator(AnnotatorError),
    /// A worker task died before producing a result
    Internal(String),
}

impl From<AnnotatorError> for ApiError {
    fn from(err: AnnotatorError) -> Self {
        ApiError::Annotator(err)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Annotator(err) => write!(f, "{}", err),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Annotator(AnnotatorError::Validation(_)) => StatusCode::BAD_REQUEST,
            ApiError::Annotator(AnnotatorError::Catalog(CatalogError::OutOfRange { .. })) => {
                StatusCode::NOT_FOUND
            }
            ApiError::Annotator(AnnotatorError::Cursor(CursorError::OutOfRange { .. })) => {
                StatusCode::CONFLICT
            }
            ApiError::Annotator(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(%status, error = %message, "request failed");
        } else {
            tracing::debug!(%status, error = %message, "request rejected");
        }

        (status, Json(json!({ "success": false, "error": message }))).into_response()
    }
}
