//! Common error types used across the workspace.
//!
//! The four kinds mirror how the engines degrade: none of them is ever
//! allowed to crash the process. Engines handle each locally and surface
//! it through logs and stale item values.

use crate::identifier::{DeviceIdentifier, ItemPath};

/// Top-level error for the bridge engines and gateway ports.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// Login rejected by the gateway — the session stays disconnected and
    /// operation proceeds degraded.
    #[error("gateway rejected the login")]
    Authentication(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Snapshot fetch failed or the device is unknown at the gateway; the
    /// device's attributes are left unchanged for this tick.
    #[error("device {identifier} is unavailable")]
    DeviceUnavailable {
        identifier: DeviceIdentifier,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Missing or mistyped item configuration — the offending item is
    /// skipped.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Outbound command rejected by the gateway — logged, not retried.
    #[error("gateway rejected command {command} for {identifier}")]
    Command {
        identifier: DeviceIdentifier,
        command: &'static str,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl BridgeError {
    /// Wrap a transport-level fetch failure for one device.
    #[must_use]
    pub fn unavailable(
        identifier: DeviceIdentifier,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::DeviceUnavailable {
            identifier,
            source: Some(Box::new(source)),
        }
    }
}

/// Details about a broken item configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    /// A device or command item has no usable (non-empty string) device
    /// identifier.
    #[error("item {path} has no usable device identifier")]
    MissingIdentifier { path: ItemPath },

    /// An item references an attribute name that is neither in the mapping
    /// table nor a write-trigger role.
    #[error("item {path} references unknown attribute {name}")]
    UnknownAttribute { path: ItemPath, name: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_device_unavailable_with_identifier() {
        let err = BridgeError::DeviceUnavailable {
            identifier: DeviceIdentifier::from("AIN1"),
            source: None,
        };
        assert_eq!(err.to_string(), "device AIN1 is unavailable");
    }

    #[test]
    fn should_display_command_error_with_command_name() {
        let err = BridgeError::Command {
            identifier: DeviceIdentifier::from("AIN2"),
            command: "sethkrtsoll",
            source: None,
        };
        assert_eq!(
            err.to_string(),
            "gateway rejected command sethkrtsoll for AIN2"
        );
    }

    #[test]
    fn should_display_configuration_error_transparently() {
        let err = BridgeError::from(ConfigurationError::MissingIdentifier {
            path: ItemPath::from("living.heater.set"),
        });
        assert_eq!(
            err.to_string(),
            "item living.heater.set has no usable device identifier"
        );
    }

    #[test]
    fn should_carry_source_for_unavailable_device() {
        let io = std::io::Error::other("connection reset");
        let err = BridgeError::unavailable(DeviceIdentifier::from("AIN1"), io);
        assert!(std::error::Error::source(&err).is_some());
    }
}
