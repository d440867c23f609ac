//! JSON handlers for attribute items.
//!
//! `write` is the external entry point into command dispatch: it stores
//! the value on the item and publishes the write on the bus with an
//! external caller tag. Whether that write becomes a gateway command is
//! the dispatch engine's decision, not this handler's.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;

use fritzsync_app::item_bus::ItemEvent;
use fritzsync_domain::identifier::ItemPath;
use fritzsync_domain::item::{Caller, ItemView};
use fritzsync_domain::value::ItemValue;

use crate::error::ApiError;
use crate::state::AppState;

/// Default caller tag for writes that do not name one.
const DEFAULT_CALLER: &str = "api";

/// Request body for writing an item value.
#[derive(Debug, Deserialize)]
pub struct WriteItemRequest {
    pub value: ItemValue,
    /// Caller tag recorded on the item; defaults to `api`.
    #[serde(default)]
    pub caller: Option<String>,
}

/// `GET /api/items`
pub async fn list(State(state): State<AppState>) -> Json<Vec<ItemView>> {
    Json(state.registry.item_views())
}

/// `GET /api/items/{path}`
pub async fn get(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Json<ItemView>, ApiError> {
    let path = ItemPath::new(path);
    let item = state
        .registry
        .get(&path)
        .ok_or(ApiError::UnknownItem(path))?;
    Ok(Json(item.view()))
}

/// `PUT /api/items/{path}`
pub async fn write(
    State(state): State<AppState>,
    Path(path): Path<String>,
    Json(request): Json<WriteItemRequest>,
) -> Result<(StatusCode, Json<ItemView>), ApiError> {
    let path = ItemPath::new(path);
    let item = state
        .registry
        .get(&path)
        .ok_or_else(|| ApiError::UnknownItem(path.clone()))?;

    let caller = Caller::External(
        request
            .caller
            .unwrap_or_else(|| DEFAULT_CALLER.to_string()),
    );
    item.set_value(request.value.clone(), caller.clone());
    state.bus.publish(ItemEvent {
        path,
        value: request.value,
        caller,
    });

    Ok((StatusCode::ACCEPTED, Json(item.view())))
}
