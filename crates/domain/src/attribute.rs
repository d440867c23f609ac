//! The attribute mapping table.
//!
//! Maps each symbolic attribute name from item configuration to a snapshot
//! field accessor plus the capability gate that controls its propagation.
//! One flat data-driven table instead of a conditional chain keeps the
//! per-attribute poll step a single lookup and makes the mapping testable
//! on its own.

use crate::snapshot::DeviceSnapshot;
use crate::value::ItemValue;

/// Capability flag that must be set on a snapshot before an attribute is
/// propagated. Presence gating happens earlier and outranks all of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityGate {
    /// Always propagated (identity fields, capability flags themselves).
    None,
    /// Requires `has_switch`.
    Switch,
    /// Requires `has_temperature_sensor`.
    TemperatureSensor,
    /// Requires `has_thermostat`.
    Thermostat,
    /// Requires `has_alarm`.
    Alarm,
}

impl CapabilityGate {
    /// Evaluate the gate against a snapshot's capability flags.
    #[must_use]
    pub fn allows(self, snapshot: &DeviceSnapshot) -> bool {
        match self {
            Self::None => true,
            Self::Switch => snapshot.has_switch,
            Self::TemperatureSensor => snapshot.has_temperature_sensor,
            Self::Thermostat => snapshot.has_thermostat,
            Self::Alarm => snapshot.has_alarm,
        }
    }
}

/// One row of the attribute mapping table.
pub struct AttributeSpec {
    /// Symbolic attribute name used in item configuration.
    pub name: &'static str,
    /// Capability gate controlling propagation.
    pub gate: CapabilityGate,
    read: fn(&DeviceSnapshot) -> Option<ItemValue>,
}

impl AttributeSpec {
    /// Read this attribute's current value out of a snapshot.
    ///
    /// Returns `None` when the device does not report the field, in which
    /// case the dependent item is left unchanged.
    #[must_use]
    pub fn read(&self, snapshot: &DeviceSnapshot) -> Option<ItemValue> {
        (self.read)(snapshot)
    }
}

macro_rules! attr {
    ($name:literal, $gate:ident, |$snap:ident| $body:expr) => {
        AttributeSpec {
            name: $name,
            gate: CapabilityGate::$gate,
            read: |$snap| $body,
        }
    };
}

/// The full telemetry attribute table.
pub static ATTRIBUTES: &[AttributeSpec] = &[
    // Identity and status, never gated
    attr!("name", None, |s| Some(ItemValue::Text(s.name.clone()))),
    attr!("ain", None, |s| Some(ItemValue::Text(
        s.identifier.as_str().to_string()
    ))),
    attr!("identifier", None, |s| Some(ItemValue::Text(
        s.identifier.as_str().to_string()
    ))),
    attr!("productname", None, |s| Some(ItemValue::Text(
        s.product_name.clone()
    ))),
    attr!("manufacturer", None, |s| Some(ItemValue::Text(
        s.manufacturer.clone()
    ))),
    attr!("present", None, |s| Some(ItemValue::Bool(s.present))),
    attr!("lock", None, |s| s.lock.map(ItemValue::Bool)),
    attr!("device_lock", None, |s| s.device_lock.map(ItemValue::Bool)),
    attr!("has_switch", None, |s| Some(ItemValue::Bool(s.has_switch))),
    attr!("has_temperature_sensor", None, |s| Some(ItemValue::Bool(
        s.has_temperature_sensor
    ))),
    attr!("has_thermostat", None, |s| Some(ItemValue::Bool(
        s.has_thermostat
    ))),
    attr!("has_alarm", None, |s| Some(ItemValue::Bool(s.has_alarm))),
    // Switch / power meter
    attr!("switch_state", Switch, |s| s.switch_state.map(ItemValue::Bool)),
    attr!("power", Switch, |s| s.power.map(ItemValue::Float)),
    attr!("energy", Switch, |s| s.energy.map(ItemValue::Float)),
    attr!("voltage", Switch, |s| s.voltage.map(ItemValue::Float)),
    // Temperature sensor
    attr!("temperature", TemperatureSensor, |s| s
        .temperature
        .map(ItemValue::Float)),
    attr!("offset", TemperatureSensor, |s| s.offset.map(ItemValue::Float)),
    // Thermostat
    attr!("actual_temperature", Thermostat, |s| s
        .actual_temperature
        .map(ItemValue::Float)),
    attr!("target_temperature", Thermostat, |s| s
        .target_temperature
        .map(ItemValue::Float)),
    attr!("comfort_temperature", Thermostat, |s| s
        .comfort_temperature
        .map(ItemValue::Float)),
    attr!("eco_temperature", Thermostat, |s| s
        .eco_temperature
        .map(ItemValue::Float)),
    attr!("battery_low", Thermostat, |s| s.battery_low.map(ItemValue::Bool)),
    attr!("battery_level", Thermostat, |s| s
        .battery_level
        .map(ItemValue::Int)),
    attr!("window_open", Thermostat, |s| s.window_open.map(ItemValue::Bool)),
    attr!("summer_active", Thermostat, |s| s
        .summer_active
        .map(ItemValue::Bool)),
    attr!("holiday_active", Thermostat, |s| s
        .holiday_active
        .map(ItemValue::Bool)),
    // Alarm sensor
    attr!("alert_state", Alarm, |s| s.alert_state.map(ItemValue::Bool)),
];

/// Look up a telemetry attribute by its configured name.
#[must_use]
pub fn lookup(name: &str) -> Option<&'static AttributeSpec> {
    ATTRIBUTES.iter().find(|spec| spec.name == name)
}

/// Write-trigger roles — attribute names whose external item writes are
/// translated into outbound gateway commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandRole {
    /// Float setpoint → set-target-temperature command.
    SetTemperature,
    /// Bool → switch-on or switch-off command.
    SetSwitchState,
    /// Carried value ignored; always issues the toggle command.
    SetSwitchStateToggle,
}

impl CommandRole {
    /// Resolve a configured attribute name to its command role, if any.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "set_temperature" => Some(Self::SetTemperature),
            "set_switch_state" => Some(Self::SetSwitchState),
            "set_switch_state_toggle" => Some(Self::SetSwitchStateToggle),
            _ => None,
        }
    }

    /// The configured attribute name for this role.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::SetTemperature => "set_temperature",
            Self::SetSwitchState => "set_switch_state",
            Self::SetSwitchStateToggle => "set_switch_state_toggle",
        }
    }
}

/// Whether a configured attribute name is known at all, in either the
/// telemetry table or the command roles.
#[must_use]
pub fn is_known(name: &str) -> bool {
    lookup(name).is_some() || CommandRole::from_name(name).is_some()
}
