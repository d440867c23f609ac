//! JSON API route assembly.

use axum::Router;
use axum::routing::{get, post};

use crate::state::AppState;

pub mod devices;
pub mod items;
pub mod poll;

/// Build the `/api` sub-router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/devices", get(devices::list))
        .route("/items", get(items::list))
        .route("/items/{path}", get(items::get).put(items::write))
        .route("/poll", post(poll::trigger))
}
