//! Shared application state for axum handlers.

use std::sync::Arc;

use tokio::sync::Notify;

use fritzsync_app::item_bus::ItemEventBus;
use fritzsync_app::registry::ItemRegistry;

/// Application state shared across all axum handlers.
///
/// Everything in here is cheaply cloneable: the registry and the poll
/// trigger sit behind `Arc`s and the bus clones its channel handle.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The configured item tree.
    pub registry: Arc<ItemRegistry>,
    /// Bus that external item writes are published on.
    pub bus: ItemEventBus,
    /// Trigger that forces an immediate poll tick.
    pub poll_trigger: Arc<Notify>,
}

impl AppState {
    /// Create the handler state from the bridge's shared pieces.
    #[must_use]
    pub fn new(registry: Arc<ItemRegistry>, bus: ItemEventBus, poll_trigger: Arc<Notify>) -> Self {
        Self {
            registry,
            bus,
            poll_trigger,
        }
    }
}
