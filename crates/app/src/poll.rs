//! Poll cycle engine — fetches device snapshots and fans values out to
//! dependent items.
//!
//! One `poll()` call is one scheduled tick. A single device's fetch
//! failure never aborts the cycle; presence gating outranks every
//! capability gate; unknown attribute names advance to the next child
//! without effect.

use std::sync::Arc;

use fritzsync_domain::attribute;
use fritzsync_domain::error::ConfigurationError;
use fritzsync_domain::item::Caller;

use crate::item_bus::{ItemEvent, ItemEventBus};
use crate::ports::GatewayClient;
use crate::registry::ItemRegistry;

/// The gateway → items half of the bridge.
pub struct PollEngine<G> {
    gateway: Arc<G>,
    registry: Arc<ItemRegistry>,
    bus: ItemEventBus,
}

impl<G: GatewayClient> PollEngine<G> {
    /// Create an engine over the shared registry and gateway.
    #[must_use]
    pub fn new(gateway: Arc<G>, registry: Arc<ItemRegistry>, bus: ItemEventBus) -> Self {
        Self {
            gateway,
            registry,
            bus,
        }
    }

    /// Run one poll tick over all configured device items.
    ///
    /// The observable effect is writing values into attribute items,
    /// attributed to [`Caller::Bridge`]. Failures are logged per device
    /// and never propagate.
    #[tracing::instrument(skip(self), fields(devices = self.registry.devices().len()))]
    pub async fn poll(&self) {
        let mut written = 0_usize;

        for device in self.registry.devices() {
            let identifier = device.identifier();
            if !identifier.is_valid() {
                tracing::warn!(
                    error = %ConfigurationError::MissingIdentifier {
                        path: device.path().clone(),
                    },
                    "skipping device item"
                );
                continue;
            }

            let snapshot = match self.gateway.device_snapshot(identifier).await {
                Ok(snapshot) => snapshot,
                Err(err) => {
                    tracing::warn!(device = %identifier, error = %err, "device not fetchable this tick");
                    continue;
                }
            };

            if !snapshot.present {
                tracing::debug!(device = %identifier, "device not present, skipping attributes");
                continue;
            }

            for child in device.children() {
                // Unknown names and command-only roles have no telemetry row.
                let Some(spec) = attribute::lookup(child.attribute()) else {
                    continue;
                };
                if !spec.gate.allows(&snapshot) {
                    continue;
                }
                let Some(value) = spec.read(&snapshot) else {
                    continue;
                };

                child.set_value(value.clone(), Caller::Bridge);
                self.bus.publish(ItemEvent {
                    path: child.path().clone(),
                    value,
                    caller: Caller::Bridge,
                });
                written += 1;
            }
        }

        tracing::debug!(written, "poll tick complete");
    }
}
