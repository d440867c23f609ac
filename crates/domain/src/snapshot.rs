//! Device snapshot — one fetched read of a device's reported state.
//!
//! A snapshot is fetched fresh on every poll tick and never cached across
//! ticks. Capability-gated value fields are `Option`s: a device without a
//! power meter simply reports no `power`, independent of the capability
//! flags that control attribute propagation.

use serde::{Deserialize, Serialize};

use crate::identifier::DeviceIdentifier;

/// Point-in-time read of one device's reported state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    /// Whether the device is currently reachable at the gateway.
    pub present: bool,

    // Identity
    pub identifier: DeviceIdentifier,
    pub name: String,
    pub product_name: String,
    pub manufacturer: String,

    // Lock switches (UI lock / physical button lock)
    pub lock: Option<bool>,
    pub device_lock: Option<bool>,

    // Capability flags
    pub has_switch: bool,
    pub has_temperature_sensor: bool,
    pub has_thermostat: bool,
    pub has_alarm: bool,

    // Switch / power meter
    pub switch_state: Option<bool>,
    /// Current power draw in watts.
    pub power: Option<f64>,
    /// Accumulated energy in watt hours.
    pub energy: Option<f64>,
    /// Line voltage in volts.
    pub voltage: Option<f64>,

    // Temperature sensor
    /// Measured temperature in degrees Celsius.
    pub temperature: Option<f64>,
    /// Configured measurement offset in degrees Celsius.
    pub offset: Option<f64>,

    // Thermostat
    pub actual_temperature: Option<f64>,
    pub target_temperature: Option<f64>,
    pub comfort_temperature: Option<f64>,
    pub eco_temperature: Option<f64>,
    pub battery_low: Option<bool>,
    /// Battery charge in percent.
    pub battery_level: Option<i64>,
    pub window_open: Option<bool>,
    pub summer_active: Option<bool>,
    pub holiday_active: Option<bool>,

    // Alarm sensor
    pub alert_state: Option<bool>,
}

impl DeviceSnapshot {
    /// A minimal present snapshot for the given identifier.
    ///
    /// All capability flags start out false; callers fill in what the
    /// device actually reports.
    #[must_use]
    pub fn present(identifier: DeviceIdentifier) -> Self {
        Self {
            present: true,
            identifier,
            ..Self::default()
        }
    }

    /// A snapshot for a device the gateway knows but cannot currently reach.
    #[must_use]
    pub fn absent(identifier: DeviceIdentifier) -> Self {
        Self {
            present: false,
            identifier,
            ..Self::default()
        }
    }
}
