//! Item registry — the configured item tree, built once at startup.
//!
//! The registry owns the tree; both engines hold it behind an `Arc` and
//! only take transient references during one poll or dispatch operation.
//! Malformed device declarations are logged and skipped, never fatal.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;

use fritzsync_domain::attribute;
use fritzsync_domain::error::ConfigurationError;
use fritzsync_domain::identifier::{DeviceIdentifier, ItemPath};
use fritzsync_domain::item::{AttributeItem, DeviceItem, ItemView};

/// Declarative configuration for one device item.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceItemConfig {
    /// Item path of the device node.
    pub path: String,
    /// Device identifier (AIN) at the gateway.
    pub ain: String,
    /// Attribute item children.
    #[serde(default)]
    pub items: Vec<AttributeItemConfig>,
}

/// Declarative configuration for one attribute item.
#[derive(Debug, Clone, Deserialize)]
pub struct AttributeItemConfig {
    /// Item path; defaults to `<device path>.<attribute>` when omitted.
    #[serde(default)]
    pub path: Option<String>,
    /// Attribute name from the mapping table or a write-trigger name.
    pub attribute: String,
    /// Whether an external write to this item forces an immediate poll.
    #[serde(default)]
    pub update_request: bool,
}

/// The configured item tree, with path lookup for dispatch.
#[derive(Debug, Default)]
pub struct ItemRegistry {
    devices: Vec<DeviceItem>,
    by_path: HashMap<ItemPath, Arc<AttributeItem>>,
}

impl ItemRegistry {
    /// Build the registry from declarative configuration.
    ///
    /// Devices without a usable identifier are logged as configuration
    /// errors and skipped. Items with unknown attribute names are kept
    /// (the poll cycle silently ignores them) but flagged once here so
    /// typos show up in the logs.
    #[must_use]
    pub fn from_config(devices: &[DeviceItemConfig]) -> Self {
        let mut registry = Self::default();

        for device in devices {
            let device_path = ItemPath::new(device.path.clone());
            let identifier = DeviceIdentifier::new(device.ain.clone());
            if !identifier.is_valid() {
                // Kept in the tree so the engines can report it per
                // operation; they skip it instead of crashing.
                tracing::warn!(
                    error = %ConfigurationError::MissingIdentifier {
                        path: device_path.clone(),
                    },
                    "device item has no usable identifier"
                );
            }

            let mut children = Vec::with_capacity(device.items.len());
            for item in &device.items {
                let path = item.path.clone().map_or_else(
                    || ItemPath::new(format!("{}.{}", device.path, item.attribute)),
                    ItemPath::new,
                );

                if !attribute::is_known(&item.attribute) {
                    tracing::warn!(
                        error = %ConfigurationError::UnknownAttribute {
                            path: path.clone(),
                            name: item.attribute.clone(),
                        },
                        "attribute will never receive a value"
                    );
                }

                if registry.by_path.contains_key(&path) {
                    tracing::warn!(path = %path, "duplicate item path, skipping");
                    continue;
                }

                let child = Arc::new(AttributeItem::new(
                    path.clone(),
                    item.attribute.clone(),
                    identifier.clone(),
                    item.update_request,
                ));
                registry.by_path.insert(path, Arc::clone(&child));
                children.push(child);
            }

            registry
                .devices
                .push(DeviceItem::new(device_path, identifier, children));
        }

        tracing::info!(
            devices = registry.devices.len(),
            items = registry.by_path.len(),
            "item registry built"
        );
        registry
    }

    /// Device items in configuration order.
    #[must_use]
    pub fn devices(&self) -> &[DeviceItem] {
        &self.devices
    }

    /// Look up an attribute item by path.
    #[must_use]
    pub fn get(&self, path: &ItemPath) -> Option<&Arc<AttributeItem>> {
        self.by_path.get(path)
    }

    /// Number of attribute items.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.by_path.len()
    }

    /// Serializable views of all attribute items, grouped by device order.
    #[must_use]
    pub fn item_views(&self) -> Vec<ItemView> {
        self.devices
            .iter()
            .flat_map(DeviceItem::children)
            .map(|item| item.view())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(serde::Deserialize)]
    struct Declarations {
        devices: Vec<DeviceItemConfig>,
    }

    fn sample_config() -> Vec<DeviceItemConfig> {
        let decls: Declarations = toml::from_str(
            r#"
            [[devices]]
            path = "living.heater"
            ain = "AIN1"
            items = [
                { attribute = "temperature" },
                { path = "living.heater.setpoint", attribute = "set_temperature" },
            ]

            [[devices]]
            path = "kitchen.plug"
            ain = "AIN2"
            items = [{ attribute = "switch_state" }]
            "#,
        )
        .unwrap();
        decls.devices
    }

    #[test]
    fn should_build_tree_in_configuration_order() {
        let registry = ItemRegistry::from_config(&sample_config());
        let paths: Vec<_> = registry
            .devices()
            .iter()
            .map(|d| d.path().as_str().to_string())
            .collect();
        assert_eq!(paths, ["living.heater", "kitchen.plug"]);
        assert_eq!(registry.item_count(), 3);
    }

    #[test]
    fn should_derive_child_path_from_device_path() {
        let registry = ItemRegistry::from_config(&sample_config());
        assert!(
            registry
                .get(&ItemPath::from("living.heater.temperature"))
                .is_some()
        );
    }

    #[test]
    fn should_keep_explicit_child_path() {
        let registry = ItemRegistry::from_config(&sample_config());
        let item = registry
            .get(&ItemPath::from("living.heater.setpoint"))
            .unwrap();
        assert_eq!(item.attribute(), "set_temperature");
        assert_eq!(item.device().as_str(), "AIN1");
    }

    #[test]
    fn should_keep_device_with_blank_identifier_for_engines_to_skip() {
        let config = vec![DeviceItemConfig {
            path: "broken".to_string(),
            ain: "  ".to_string(),
            items: vec![AttributeItemConfig {
                path: None,
                attribute: "temperature".to_string(),
                update_request: false,
            }],
        }];
        let registry = ItemRegistry::from_config(&config);
        assert_eq!(registry.devices().len(), 1);
        assert!(!registry.devices()[0].identifier().is_valid());
    }

    #[test]
    fn should_keep_unknown_attribute_items() {
        let config = vec![DeviceItemConfig {
            path: "dev".to_string(),
            ain: "AIN1".to_string(),
            items: vec![AttributeItemConfig {
                path: None,
                attribute: "humidity".to_string(),
                update_request: false,
            }],
        }];
        let registry = ItemRegistry::from_config(&config);
        assert_eq!(registry.item_count(), 1);
    }

    #[test]
    fn should_skip_duplicate_item_paths() {
        let config = vec![DeviceItemConfig {
            path: "dev".to_string(),
            ain: "AIN1".to_string(),
            items: vec![
                AttributeItemConfig {
                    path: Some("dev.temp".to_string()),
                    attribute: "temperature".to_string(),
                    update_request: false,
                },
                AttributeItemConfig {
                    path: Some("dev.temp".to_string()),
                    attribute: "offset".to_string(),
                    update_request: false,
                },
            ],
        }];
        let registry = ItemRegistry::from_config(&config);
        assert_eq!(registry.item_count(), 1);
        let item = registry.get(&ItemPath::from("dev.temp")).unwrap();
        assert_eq!(item.attribute(), "temperature");
    }

    #[test]
    fn should_expose_views_for_all_items() {
        let registry = ItemRegistry::from_config(&sample_config());
        let views = registry.item_views();
        assert_eq!(views.len(), 3);
        assert!(views.iter().all(|v| v.value.is_none()));
    }
}
