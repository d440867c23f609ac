//! `getdeviceinfos` XML model and mapping into [`DeviceSnapshot`].
//!
//! The AHA interface reports values in fixed-point units: temperatures in
//! 0.1 °C, HKR setpoints in 0.5 °C, power in mW, energy in Wh, voltage in
//! mV. Everything is converted to °C / W / Wh / V here so the rest of the
//! system never sees wire units.

use serde::{Deserialize, Deserializer};

use fritzsync_domain::identifier::DeviceIdentifier;
use fritzsync_domain::snapshot::DeviceSnapshot;

use crate::error::AhaError;

// Relevant bits of the device functionbitmask.
const BIT_ALARM: u32 = 1 << 4;
const BIT_THERMOSTAT: u32 = 1 << 6;
const BIT_POWER_METER: u32 = 1 << 7;
const BIT_TEMPERATURE_SENSOR: u32 = 1 << 8;
const BIT_SWITCH: u32 = 1 << 9;

/// HKR setpoint sentinel: radiator permanently off.
const HKR_OFF: i64 = 253;
/// HKR setpoint sentinel: radiator permanently on.
const HKR_ON: i64 = 254;

/// Absent devices report empty elements (`<celsius></celsius>`); treat
/// anything unparsable as "not reported".
fn lenient_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.trim().parse().ok()))
}

#[derive(Debug, Deserialize)]
pub struct DeviceXml {
    #[serde(rename = "@identifier")]
    identifier: String,
    #[serde(rename = "@functionbitmask")]
    functionbitmask: u32,
    #[serde(rename = "@manufacturer", default)]
    manufacturer: String,
    #[serde(rename = "@productname", default)]
    productname: String,
    #[serde(default, deserialize_with = "lenient_i64")]
    present: Option<i64>,
    #[serde(default)]
    name: String,
    switch: Option<SwitchXml>,
    powermeter: Option<PowerMeterXml>,
    temperature: Option<TemperatureXml>,
    hkr: Option<HkrXml>,
    alert: Option<AlertXml>,
}

#[derive(Debug, Deserialize)]
struct SwitchXml {
    #[serde(default, deserialize_with = "lenient_i64")]
    state: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    lock: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    devicelock: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct PowerMeterXml {
    #[serde(default, deserialize_with = "lenient_i64")]
    power: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    energy: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    voltage: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TemperatureXml {
    #[serde(default, deserialize_with = "lenient_i64")]
    celsius: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct HkrXml {
    #[serde(default, deserialize_with = "lenient_i64")]
    tist: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    tsoll: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    absenk: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    komfort: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    batterylow: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    battery: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    windowopenactiv: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    summeractive: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    holidayactive: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct AlertXml {
    #[serde(default, deserialize_with = "lenient_i64")]
    state: Option<i64>,
}

#[allow(clippy::cast_precision_loss)]
fn tenths(raw: Option<i64>) -> Option<f64> {
    raw.map(|v| v as f64 / 10.0)
}

#[allow(clippy::cast_precision_loss)]
fn thousandths(raw: Option<i64>) -> Option<f64> {
    raw.map(|v| v as f64 / 1000.0)
}

/// Decode an HKR setpoint in 0.5 °C steps; the on/off sentinels carry no
/// temperature and map to "not reported".
#[allow(clippy::cast_precision_loss)]
fn halves(raw: Option<i64>) -> Option<f64> {
    match raw {
        Some(HKR_OFF | HKR_ON) | None => None,
        Some(v) => Some(v as f64 / 2.0),
    }
}

fn flag(raw: Option<i64>) -> Option<bool> {
    raw.map(|v| v != 0)
}

/// Encode a target temperature in °C as a `sethkrtsoll` parameter
/// (0.5 °C steps, clamped to the valid 8–28 °C range).
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn encode_setpoint(celsius: f64) -> u8 {
    let raw = (celsius * 2.0).round().clamp(16.0, 56.0);
    raw as u8
}

impl DeviceXml {
    /// Parse the XML body of a `getdeviceinfos` response.
    pub fn parse(xml: &str) -> Result<Self, AhaError> {
        Ok(quick_xml::de::from_str(xml)?)
    }

    /// Map the wire representation into a domain snapshot.
    #[must_use]
    pub fn into_snapshot(self) -> DeviceSnapshot {
        let mut snapshot = DeviceSnapshot {
            present: self.present == Some(1),
            identifier: DeviceIdentifier::new(self.identifier),
            name: self.name,
            product_name: self.productname,
            manufacturer: self.manufacturer,
            has_switch: self.functionbitmask & BIT_SWITCH != 0,
            has_temperature_sensor: self.functionbitmask & BIT_TEMPERATURE_SENSOR != 0,
            has_thermostat: self.functionbitmask & BIT_THERMOSTAT != 0,
            has_alarm: self.functionbitmask & BIT_ALARM != 0,
            ..DeviceSnapshot::default()
        };

        if let Some(switch) = self.switch {
            snapshot.switch_state = flag(switch.state);
            snapshot.lock = flag(switch.lock);
            snapshot.device_lock = flag(switch.devicelock);
        }
        if self.functionbitmask & BIT_POWER_METER != 0
            && let Some(meter) = self.powermeter
        {
            snapshot.power = thousandths(meter.power);
            #[allow(clippy::cast_precision_loss)]
            {
                snapshot.energy = meter.energy.map(|v| v as f64);
            }
            snapshot.voltage = thousandths(meter.voltage);
        }
        if let Some(temperature) = self.temperature {
            snapshot.temperature = tenths(temperature.celsius);
            snapshot.offset = tenths(temperature.offset);
        }
        if let Some(hkr) = self.hkr {
            snapshot.actual_temperature = halves(hkr.tist);
            snapshot.target_temperature = halves(hkr.tsoll);
            snapshot.eco_temperature = halves(hkr.absenk);
            snapshot.comfort_temperature = halves(hkr.komfort);
            snapshot.battery_low = flag(hkr.batterylow);
            snapshot.battery_level = hkr.battery;
            snapshot.window_open = flag(hkr.windowopenactiv);
            snapshot.summer_active = flag(hkr.summeractive);
            snapshot.holiday_active = flag(hkr.holidayactive);
        }
        if let Some(alert) = self.alert {
            snapshot.alert_state = flag(alert.state);
        }

        snapshot
    }
}
