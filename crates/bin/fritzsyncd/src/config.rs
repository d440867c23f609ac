//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `fritzsync.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use serde::Deserialize;
use url::Url;

use fritzsync_app::registry::{AttributeItemConfig, DeviceItemConfig};

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Device gateway settings.
    pub gateway: GatewayConfig,
    /// Poll cycle settings.
    pub poll: PollConfig,
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Item tree declarations.
    pub devices: Vec<DeviceItemConfig>,
}

/// Device gateway connection settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Gateway host name or address (e.g. `fritz.box`).
    pub host: String,
    /// Login user name. May be empty on gateways without named users.
    pub username: String,
    /// Login password.
    pub password: String,
    /// Use the simulated gateway instead of a real one.
    pub virtual_enabled: bool,
}

/// Poll cycle configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Seconds between poll ticks.
    pub cycle_secs: u64,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `fritzsync.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or the
    /// resulting configuration is semantically invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("fritzsync.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("FRITZSYNC_GATEWAY_HOST") {
            self.gateway.host = val;
        }
        if let Ok(val) = std::env::var("FRITZSYNC_USERNAME") {
            self.gateway.username = val;
        }
        if let Ok(val) = std::env::var("FRITZSYNC_PASSWORD") {
            self.gateway.password = val;
        }
        if let Ok(val) = std::env::var("FRITZSYNC_CYCLE_SECS") {
            if let Ok(secs) = val.parse() {
                self.poll.cycle_secs = secs;
            }
        }
        if let Ok(val) = std::env::var("FRITZSYNC_BIND") {
            if let Some((host, port)) = val.rsplit_once(':') {
                self.server.host = host.to_string();
                if let Ok(port) = port.parse() {
                    self.server.port = port;
                }
            }
        }
        if let Ok(val) = std::env::var("FRITZSYNC_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.poll.cycle_secs == 0 {
            return Err(ConfigError::Validation(
                "poll cycle must be non-zero".to_string(),
            ));
        }
        if !self.gateway.virtual_enabled && self.gateway.password.is_empty() {
            return Err(ConfigError::Validation(
                "gateway password is required unless the virtual gateway is enabled".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Return the gateway base url.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured host does not form a valid url.
    pub fn gateway_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&format!("http://{}/", self.gateway.host)).map_err(|err| {
            ConfigError::Validation(format!("invalid gateway host {}: {err}", self.gateway.host))
        })
    }

    /// The configured device declarations, falling back to the demo tree
    /// when the virtual gateway is enabled and no devices are declared.
    #[must_use]
    pub fn device_declarations(&self) -> Vec<DeviceItemConfig> {
        if self.devices.is_empty() && self.gateway.virtual_enabled {
            return demo_declarations();
        }
        self.devices.clone()
    }
}

/// Item declarations matching the virtual gateway's demo devices.
fn demo_declarations() -> Vec<DeviceItemConfig> {
    fn item(attribute: &str) -> AttributeItemConfig {
        AttributeItemConfig {
            path: None,
            attribute: attribute.to_string(),
            update_request: false,
        }
    }

    vec![
        DeviceItemConfig {
            path: "demo.thermostat".to_string(),
            ain: "virtual-thermostat".to_string(),
            items: vec![
                item("name"),
                item("present"),
                item("temperature"),
                item("target_temperature"),
                item("set_temperature"),
                item("battery_level"),
            ],
        },
        DeviceItemConfig {
            path: "demo.plug".to_string(),
            ain: "virtual-plug".to_string(),
            items: vec![
                item("name"),
                item("present"),
                item("switch_state"),
                item("power"),
                item("set_switch_state"),
                item("set_switch_state_toggle"),
            ],
        },
    ]
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "fritz.box".to_string(),
            username: String::new(),
            password: String::new(),
            virtual_enabled: true,
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self { cycle_secs: 300 }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "fritzsyncd=info,fritzsync=info,tower_http=debug".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.gateway.host, "fritz.box");
        assert!(config.gateway.virtual_enabled);
        assert_eq!(config.poll.cycle_secs, 300);
        assert_eq!(config.server.port, 3000);
        assert!(config.devices.is_empty());
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 3000);
        assert!(config.gateway.virtual_enabled);
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = r#"
            [gateway]
            host = '192.168.178.1'
            username = 'admin'
            password = 'secret'
            virtual_enabled = false

            [poll]
            cycle_secs = 60

            [server]
            host = '127.0.0.1'
            port = 9090

            [logging]
            filter = 'debug'

            [[devices]]
            path = 'living.heater'
            ain = '11960 0071472'
            items = [
                { attribute = 'temperature' },
                { path = 'living.heater.setpoint', attribute = 'set_temperature' },
            ]
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.gateway.host, "192.168.178.1");
        assert!(!config.gateway.virtual_enabled);
        assert_eq!(config.poll.cycle_secs, 60);
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.logging.filter, "debug");
        assert_eq!(config.devices.len(), 1);
        assert_eq!(config.devices[0].items.len(), 2);
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn should_reject_zero_port() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_zero_poll_cycle() {
        let mut config = Config::default();
        config.poll.cycle_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_require_password_for_real_gateway() {
        let mut config = Config::default();
        config.gateway.virtual_enabled = false;
        assert!(config.validate().is_err());
        config.gateway.password = "secret".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_format_bind_addr() {
        let config = Config::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn should_build_gateway_url_from_host() {
        let config = Config::default();
        assert_eq!(config.gateway_url().unwrap().as_str(), "http://fritz.box/");
    }

    #[test]
    fn should_fall_back_to_demo_declarations_for_virtual_gateway() {
        let config = Config::default();
        let devices = config.device_declarations();
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].ain, "virtual-thermostat");
    }

    #[test]
    fn should_prefer_declared_devices_over_demo_tree() {
        let toml = r"
            [[devices]]
            path = 'dev'
            ain = 'AIN1'
        ";
        let config: Config = toml::from_str(toml).unwrap();
        let devices = config.device_declarations();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].ain, "AIN1");
    }
}
