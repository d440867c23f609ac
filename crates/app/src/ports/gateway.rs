//! Gateway port — the opaque device gateway capability.
//!
//! This is a **port** — the engines call it to fetch device snapshots and
//! issue commands; adapter crates provide concrete implementations (the
//! AHA HTTP client, the virtual gateway). The session protocol behind
//! `login`/`logout` is the adapter's business; the engines only care about
//! the error taxonomy.

use std::future::Future;

use fritzsync_domain::error::BridgeError;
use fritzsync_domain::identifier::DeviceIdentifier;
use fritzsync_domain::snapshot::DeviceSnapshot;

/// Client capability exposed by a device gateway.
pub trait GatewayClient: Send + Sync {
    /// Establish a session.
    ///
    /// A rejected login surfaces as [`BridgeError::Authentication`].
    fn login(&self) -> impl Future<Output = Result<(), BridgeError>> + Send;

    /// Tear down the session. Safe to call without one.
    fn logout(&self) -> impl Future<Output = Result<(), BridgeError>> + Send;

    /// Fetch a fresh snapshot of one device.
    ///
    /// A fetch failure (network, session, unknown device) surfaces as
    /// [`BridgeError::DeviceUnavailable`].
    fn device_snapshot(
        &self,
        identifier: &DeviceIdentifier,
    ) -> impl Future<Output = Result<DeviceSnapshot, BridgeError>> + Send;

    /// Set a thermostat's target temperature in degrees Celsius.
    fn set_target_temperature(
        &self,
        identifier: &DeviceIdentifier,
        temperature: f64,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;

    /// Switch an actor on.
    fn set_switch_on(
        &self,
        identifier: &DeviceIdentifier,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;

    /// Switch an actor off.
    fn set_switch_off(
        &self,
        identifier: &DeviceIdentifier,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;

    /// Toggle an actor's switch state.
    fn set_switch_toggle(
        &self,
        identifier: &DeviceIdentifier,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;
}
