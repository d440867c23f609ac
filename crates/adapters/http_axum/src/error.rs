//! HTTP error mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use fritzsync_domain::identifier::ItemPath;

/// Errors surfaced to API clients.
#[derive(Debug)]
pub enum ApiError {
    /// No attribute item exists at the requested path.
    UnknownItem(ItemPath),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::UnknownItem(path) => (
                StatusCode::NOT_FOUND,
                Json(ErrorBody {
                    error: format!("no item at path {path}"),
                }),
            )
                .into_response(),
        }
    }
}
