//! Identifier newtypes backed by plain strings.
//!
//! Unlike randomly generated ids, both identifiers in this domain are
//! externally supplied: the gateway assigns device identifiers (AINs) and
//! the configuration assigns item paths. Neither is ever generated here.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable string key for one device at the gateway (the AIN).
///
/// Supplied via item configuration, immutable for the device's lifetime.
/// May be empty when the configuration is malformed — engines treat an
/// empty identifier as a configuration error, never as a panic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceIdentifier(String);

impl DeviceIdentifier {
    /// Wrap a raw identifier string.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Access the raw identifier string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identifier is usable for addressing a device.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.0.trim().is_empty()
    }
}

impl fmt::Display for DeviceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceIdentifier {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// Dotted path naming one logical item (e.g. `living.heater.temperature`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemPath(String);

impl ItemPath {
    /// Wrap a raw path string.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Access the raw path string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemPath {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}
