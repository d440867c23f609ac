//! JSON handlers for the device level of the item tree.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use fritzsync_domain::identifier::{DeviceIdentifier, ItemPath};

use crate::state::AppState;

/// One configured device item and its attribute children.
#[derive(Debug, Serialize)]
pub struct DeviceSummary {
    pub path: ItemPath,
    pub identifier: DeviceIdentifier,
    pub items: Vec<ItemPath>,
}

/// `GET /api/devices`
pub async fn list(State(state): State<AppState>) -> Json<Vec<DeviceSummary>> {
    let devices = state
        .registry
        .devices()
        .iter()
        .map(|device| DeviceSummary {
            path: device.path().clone(),
            identifier: device.identifier().clone(),
            items: device
                .children()
                .iter()
                .map(|child| child.path().clone())
                .collect(),
        })
        .collect();
    Json(devices)
}
