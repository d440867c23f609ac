//! The logical item tree — device items and their attribute item children.
//!
//! Items are created once at configuration time and never deleted at
//! runtime; only an attribute item's *value* is mutable. Each attribute
//! item caches its owning device identifier at construction so command
//! dispatch never needs to walk the tree on an event.

use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::attribute::CommandRole;
use crate::identifier::{DeviceIdentifier, ItemPath};
use crate::time::{self, Timestamp};
use crate::value::ItemValue;

/// Who caused an item write.
///
/// The poll cycle engine attributes its own telemetry writes to
/// [`Caller::Bridge`] so that command dispatch can tell them apart from
/// external writes and avoid re-issuing commands for its own propagation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Caller {
    /// The bridge's own poll cycle engine.
    Bridge,
    /// Anything outside the bridge (API client, rule engine, …).
    External(String),
}

#[derive(Debug, Default)]
struct ItemState {
    value: Option<ItemValue>,
    caller: Option<Caller>,
    last_updated: Option<Timestamp>,
}

/// A child of exactly one device item, tagged with one attribute name.
///
/// Telemetry and command roles are not mutually exclusive: the engine
/// writes telemetry values on poll, and external writes to command-role
/// items trigger dispatch.
#[derive(Debug)]
pub struct AttributeItem {
    path: ItemPath,
    attribute: String,
    device: DeviceIdentifier,
    update_request: bool,
    state: RwLock<ItemState>,
}

impl AttributeItem {
    /// Create an attribute item owned by the device with `device` identifier.
    #[must_use]
    pub fn new(
        path: ItemPath,
        attribute: impl Into<String>,
        device: DeviceIdentifier,
        update_request: bool,
    ) -> Self {
        Self {
            path,
            attribute: attribute.into(),
            device,
            update_request,
            state: RwLock::new(ItemState::default()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &ItemPath {
        &self.path
    }

    /// The configured attribute name.
    #[must_use]
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// The cached owning device identifier.
    #[must_use]
    pub fn device(&self) -> &DeviceIdentifier {
        &self.device
    }

    /// Whether an external write to this item forces an immediate poll.
    #[must_use]
    pub fn is_update_request(&self) -> bool {
        self.update_request
    }

    /// The write-trigger role of this item, if its attribute name is one.
    #[must_use]
    pub fn command_role(&self) -> Option<CommandRole> {
        CommandRole::from_name(&self.attribute)
    }

    /// The current value, if any write has happened yet.
    #[must_use]
    pub fn value(&self) -> Option<ItemValue> {
        self.lock_read().value.clone()
    }

    /// Who performed the most recent write.
    #[must_use]
    pub fn last_caller(&self) -> Option<Caller> {
        self.lock_read().caller.clone()
    }

    /// Write a value, recording the caller and the update time.
    pub fn set_value(&self, value: ItemValue, caller: Caller) {
        let mut state = self.lock_write();
        state.value = Some(value);
        state.caller = Some(caller);
        state.last_updated = Some(time::now());
    }

    /// A serializable view of the item for status surfaces.
    #[must_use]
    pub fn view(&self) -> ItemView {
        let state = self.lock_read();
        ItemView {
            path: self.path.clone(),
            attribute: self.attribute.clone(),
            device: self.device.clone(),
            update_request: self.update_request,
            value: state.value.clone(),
            caller: state.caller.clone(),
            last_updated: state.last_updated,
        }
    }

    fn lock_read(&self) -> std::sync::RwLockReadGuard<'_, ItemState> {
        // Lock poisoning cannot outlive a panic-free writer; recover the
        // inner state either way.
        self.state.read().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn lock_write(&self) -> std::sync::RwLockWriteGuard<'_, ItemState> {
        self.state.write().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// A node in the item tree tagged with a device identifier, owning zero or
/// more attribute items.
#[derive(Debug)]
pub struct DeviceItem {
    path: ItemPath,
    identifier: DeviceIdentifier,
    children: Vec<Arc<AttributeItem>>,
}

impl DeviceItem {
    /// Create a device item with its attribute children.
    #[must_use]
    pub fn new(
        path: ItemPath,
        identifier: DeviceIdentifier,
        children: Vec<Arc<AttributeItem>>,
    ) -> Self {
        Self {
            path,
            identifier,
            children,
        }
    }

    #[must_use]
    pub fn path(&self) -> &ItemPath {
        &self.path
    }

    /// The configured device identifier (AIN).
    #[must_use]
    pub fn identifier(&self) -> &DeviceIdentifier {
        &self.identifier
    }

    /// The attribute item children, in configuration order.
    #[must_use]
    pub fn children(&self) -> &[Arc<AttributeItem>] {
        &self.children
    }
}

/// Serializable snapshot of one attribute item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemView {
    pub path: ItemPath,
    pub attribute: String,
    pub device: DeviceIdentifier,
    pub update_request: bool,
    pub value: Option<ItemValue>,
    pub caller: Option<Caller>,
    pub last_updated: Option<Timestamp>,
}
