//! # fritzsync-adapter-virtual
//!
//! Virtual/demo gateway that provides simulated devices for testing and
//! demonstration purposes.
//!
//! ## Provided demo devices
//!
//! | Identifier | Behaviour |
//! |------------|-----------|
//! | `virtual-thermostat` | Thermostat + temperature sensor; responds to set-target-temperature |
//! | `virtual-plug` | Switch + power meter; responds to on/off/toggle |
//!
//! ## Dependency rule
//!
//! Depends on `fritzsync-app` (port trait) and `fritzsync-domain` only.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;

use fritzsync_app::ports::GatewayClient;
use fritzsync_domain::error::BridgeError;
use fritzsync_domain::identifier::DeviceIdentifier;
use fritzsync_domain::snapshot::DeviceSnapshot;

/// Simulated gateway holding mutable device snapshots in memory.
#[derive(Default)]
pub struct VirtualGateway {
    devices: Mutex<HashMap<String, DeviceSnapshot>>,
}

impl VirtualGateway {
    /// An empty gateway; add devices with [`insert`](Self::insert).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A gateway pre-populated with the demo thermostat and plug.
    #[must_use]
    pub fn demo() -> Self {
        let gateway = Self::new();
        gateway.insert(DeviceSnapshot {
            name: "Virtual Thermostat".to_string(),
            product_name: "VThermostat-1".to_string(),
            manufacturer: "fritzsync".to_string(),
            has_thermostat: true,
            has_temperature_sensor: true,
            temperature: Some(21.5),
            actual_temperature: Some(21.5),
            target_temperature: Some(21.0),
            comfort_temperature: Some(22.0),
            eco_temperature: Some(17.0),
            battery_low: Some(false),
            battery_level: Some(90),
            window_open: Some(false),
            summer_active: Some(false),
            holiday_active: Some(false),
            ..DeviceSnapshot::present(DeviceIdentifier::from("virtual-thermostat"))
        });
        gateway.insert(DeviceSnapshot {
            name: "Virtual Plug".to_string(),
            product_name: "VPlug-1".to_string(),
            manufacturer: "fritzsync".to_string(),
            has_switch: true,
            switch_state: Some(false),
            power: Some(0.0),
            energy: Some(125.0),
            voltage: Some(230.0),
            lock: Some(false),
            device_lock: Some(false),
            ..DeviceSnapshot::present(DeviceIdentifier::from("virtual-plug"))
        });
        gateway
    }

    /// Add or replace a simulated device.
    pub fn insert(&self, snapshot: DeviceSnapshot) {
        self.lock_devices()
            .insert(snapshot.identifier.as_str().to_string(), snapshot);
    }

    fn lock_devices(&self) -> std::sync::MutexGuard<'_, HashMap<String, DeviceSnapshot>> {
        self.devices
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn with_device<T>(
        &self,
        identifier: &DeviceIdentifier,
        f: impl FnOnce(&mut DeviceSnapshot) -> Result<T, BridgeError>,
    ) -> Result<T, BridgeError> {
        let mut devices = self.lock_devices();
        let snapshot =
            devices
                .get_mut(identifier.as_str())
                .ok_or_else(|| BridgeError::DeviceUnavailable {
                    identifier: identifier.clone(),
                    source: None,
                })?;
        f(snapshot)
    }
}

impl GatewayClient for VirtualGateway {
    fn login(&self) -> impl Future<Output = Result<(), BridgeError>> + Send {
        tracing::debug!("virtual gateway login");
        async { Ok(()) }
    }

    fn logout(&self) -> impl Future<Output = Result<(), BridgeError>> + Send {
        tracing::debug!("virtual gateway logout");
        async { Ok(()) }
    }

    fn device_snapshot(
        &self,
        identifier: &DeviceIdentifier,
    ) -> impl Future<Output = Result<DeviceSnapshot, BridgeError>> + Send {
        let result = self.with_device(identifier, |snapshot| Ok(snapshot.clone()));
        async { result }
    }

    fn set_target_temperature(
        &self,
        identifier: &DeviceIdentifier,
        temperature: f64,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send {
        let result = self.with_device(identifier, |snapshot| {
            if !snapshot.has_thermostat {
                return Err(BridgeError::Command {
                    identifier: snapshot.identifier.clone(),
                    command: "sethkrtsoll",
                    source: None,
                });
            }
            snapshot.target_temperature = Some(temperature);
            Ok(())
        });
        async { result }
    }

    fn set_switch_on(
        &self,
        identifier: &DeviceIdentifier,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send {
        let result = self.set_switch(identifier, "setswitchon", |_| true);
        async { result }
    }

    fn set_switch_off(
        &self,
        identifier: &DeviceIdentifier,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send {
        let result = self.set_switch(identifier, "setswitchoff", |_| false);
        async { result }
    }

    fn set_switch_toggle(
        &self,
        identifier: &DeviceIdentifier,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send {
        let result = self.set_switch(identifier, "setswitchtoggle", |state| !state);
        async { result }
    }
}

impl VirtualGateway {
    fn set_switch(
        &self,
        identifier: &DeviceIdentifier,
        command: &'static str,
        next: impl FnOnce(bool) -> bool,
    ) -> Result<(), BridgeError> {
        self.with_device(identifier, |snapshot| {
            if !snapshot.has_switch {
                return Err(BridgeError::Command {
                    identifier: snapshot.identifier.clone(),
                    command,
                    source: None,
                });
            }
            let state = snapshot.switch_state.unwrap_or(false);
            snapshot.switch_state = Some(next(state));
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plug() -> DeviceIdentifier {
        DeviceIdentifier::from("virtual-plug")
    }

    fn thermostat() -> DeviceIdentifier {
        DeviceIdentifier::from("virtual-thermostat")
    }

    #[tokio::test]
    async fn should_serve_demo_snapshots() {
        let gateway = VirtualGateway::demo();
        let snapshot = gateway.device_snapshot(&thermostat()).await.unwrap();
        assert!(snapshot.present);
        assert!(snapshot.has_thermostat);
        assert_eq!(snapshot.temperature, Some(21.5));
    }

    #[tokio::test]
    async fn should_report_unknown_device_as_unavailable() {
        let gateway = VirtualGateway::demo();
        let err = gateway
            .device_snapshot(&DeviceIdentifier::from("nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::DeviceUnavailable { .. }));
    }

    #[tokio::test]
    async fn should_update_target_temperature_on_command() {
        let gateway = VirtualGateway::demo();
        gateway
            .set_target_temperature(&thermostat(), 23.5)
            .await
            .unwrap();
        let snapshot = gateway.device_snapshot(&thermostat()).await.unwrap();
        assert_eq!(snapshot.target_temperature, Some(23.5));
    }

    #[tokio::test]
    async fn should_reject_thermostat_command_on_plug() {
        let gateway = VirtualGateway::demo();
        let err = gateway
            .set_target_temperature(&plug(), 23.5)
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::Command { .. }));
    }

    #[tokio::test]
    async fn should_switch_plug_on_and_off() {
        let gateway = VirtualGateway::demo();
        gateway.set_switch_on(&plug()).await.unwrap();
        assert_eq!(
            gateway.device_snapshot(&plug()).await.unwrap().switch_state,
            Some(true)
        );
        gateway.set_switch_off(&plug()).await.unwrap();
        assert_eq!(
            gateway.device_snapshot(&plug()).await.unwrap().switch_state,
            Some(false)
        );
    }

    #[tokio::test]
    async fn should_toggle_plug_state() {
        let gateway = VirtualGateway::demo();
        gateway.set_switch_toggle(&plug()).await.unwrap();
        assert_eq!(
            gateway.device_snapshot(&plug()).await.unwrap().switch_state,
            Some(true)
        );
        gateway.set_switch_toggle(&plug()).await.unwrap();
        assert_eq!(
            gateway.device_snapshot(&plug()).await.unwrap().switch_state,
            Some(false)
        );
    }
}
