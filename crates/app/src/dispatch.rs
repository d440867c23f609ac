//! Command dispatch engine — reacts to external item writes and issues the
//! matching gateway command.
//!
//! Consumes [`ItemEvent`]s from the item bus. Writes attributed to the
//! bridge itself are dropped so telemetry propagation can never re-issue
//! commands. Command failures are logged and never retried.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;
use tokio::sync::broadcast::error::RecvError;

use fritzsync_domain::attribute::CommandRole;
use fritzsync_domain::error::{BridgeError, ConfigurationError};
use fritzsync_domain::item::Caller;

use crate::item_bus::ItemEvent;
use crate::ports::GatewayClient;
use crate::registry::ItemRegistry;

/// The items → gateway half of the bridge.
pub struct CommandDispatcher<G> {
    gateway: Arc<G>,
    registry: Arc<ItemRegistry>,
    live: Arc<AtomicBool>,
    poll_trigger: Arc<Notify>,
}

impl<G: GatewayClient> CommandDispatcher<G> {
    /// Create a dispatcher sharing the bridge's live flag and force-poll
    /// trigger.
    #[must_use]
    pub fn new(
        gateway: Arc<G>,
        registry: Arc<ItemRegistry>,
        live: Arc<AtomicBool>,
        poll_trigger: Arc<Notify>,
    ) -> Self {
        Self {
            gateway,
            registry,
            live,
            poll_trigger,
        }
    }

    /// Drain a bus subscription until the bus is closed.
    pub async fn run(self, mut events: tokio::sync::broadcast::Receiver<ItemEvent>) {
        loop {
            match events.recv().await {
                Ok(event) => self.handle_event(&event).await,
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "dispatcher lagged behind the item bus");
                }
                Err(RecvError::Closed) => break,
            }
        }
    }

    /// Handle one item write event.
    #[tracing::instrument(skip(self, event), fields(item = %event.path))]
    pub async fn handle_event(&self, event: &ItemEvent) {
        if !self.live.load(Ordering::SeqCst) {
            tracing::debug!("bridge not live, dropping item write");
            return;
        }

        // Loop prevention: the poll engine's own propagation never
        // triggers a command.
        if event.caller == Caller::Bridge {
            return;
        }

        let Some(item) = self.registry.get(&event.path) else {
            tracing::debug!("write for unconfigured item, ignoring");
            return;
        };

        if item.is_update_request() {
            tracing::info!("immediate poll requested");
            self.poll_trigger.notify_one();
            return;
        }

        let Some(role) = item.command_role() else {
            return;
        };

        let identifier = item.device();
        if !identifier.is_valid() {
            tracing::error!(
                error = %ConfigurationError::MissingIdentifier {
                    path: event.path.clone(),
                },
                "cannot dispatch command"
            );
            return;
        }

        tracing::info!(device = %identifier, role = role.name(), "item changed outside the bridge");

        let result = match role {
            CommandRole::SetTemperature => {
                let Some(temperature) = event.value.as_f64() else {
                    tracing::error!(value = ?event.value, "setpoint value is not numeric");
                    return;
                };
                self.gateway
                    .set_target_temperature(identifier, temperature)
                    .await
            }
            CommandRole::SetSwitchState => {
                let Some(on) = event.value.as_bool() else {
                    tracing::error!(value = ?event.value, "switch value is not boolean");
                    return;
                };
                if on {
                    self.gateway.set_switch_on(identifier).await
                } else {
                    self.gateway.set_switch_off(identifier).await
                }
            }
            // The carried value is deliberately ignored.
            CommandRole::SetSwitchStateToggle => self.gateway.set_switch_toggle(identifier).await,
        };

        if let Err(err) = result {
            log_command_failure(&err);
        }
    }
}

fn log_command_failure(err: &BridgeError) {
    tracing::error!(error = %err, "gateway command failed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::sync::Mutex;
    use std::time::Duration;

    use fritzsync_domain::identifier::{DeviceIdentifier, ItemPath};
    use fritzsync_domain::snapshot::DeviceSnapshot;
    use fritzsync_domain::value::ItemValue;

    use crate::registry::{AttributeItemConfig, DeviceItemConfig};

    #[derive(Debug, Clone, PartialEq)]
    enum Command {
        Target(String, f64),
        On(String),
        Off(String),
        Toggle(String),
    }

    /// Gateway fake recording every issued command.
    #[derive(Default)]
    struct RecordingGateway {
        commands: Mutex<Vec<Command>>,
        reject_commands: bool,
    }

    impl RecordingGateway {
        fn rejecting() -> Self {
            Self {
                reject_commands: true,
                ..Self::default()
            }
        }

        fn commands(&self) -> Vec<Command> {
            self.commands.lock().unwrap().clone()
        }

        fn record(&self, command: Command, name: &'static str) -> Result<(), BridgeError> {
            if self.reject_commands {
                return Err(BridgeError::Command {
                    identifier: DeviceIdentifier::from("AIN2"),
                    command: name,
                    source: None,
                });
            }
            self.commands.lock().unwrap().push(command);
            Ok(())
        }
    }

    impl GatewayClient for RecordingGateway {
        fn login(&self) -> impl Future<Output = Result<(), BridgeError>> + Send {
            async { Ok(()) }
        }

        fn logout(&self) -> impl Future<Output = Result<(), BridgeError>> + Send {
            async { Ok(()) }
        }

        fn device_snapshot(
            &self,
            identifier: &DeviceIdentifier,
        ) -> impl Future<Output = Result<DeviceSnapshot, BridgeError>> + Send {
            let snapshot = DeviceSnapshot::present(identifier.clone());
            async { Ok(snapshot) }
        }

        fn set_target_temperature(
            &self,
            identifier: &DeviceIdentifier,
            temperature: f64,
        ) -> impl Future<Output = Result<(), BridgeError>> + Send {
            let result = self.record(
                Command::Target(identifier.as_str().to_string(), temperature),
                "sethkrtsoll",
            );
            async { result }
        }

        fn set_switch_on(
            &self,
            identifier: &DeviceIdentifier,
        ) -> impl Future<Output = Result<(), BridgeError>> + Send {
            let result = self.record(Command::On(identifier.as_str().to_string()), "setswitchon");
            async { result }
        }

        fn set_switch_off(
            &self,
            identifier: &DeviceIdentifier,
        ) -> impl Future<Output = Result<(), BridgeError>> + Send {
            let result =
                self.record(Command::Off(identifier.as_str().to_string()), "setswitchoff");
            async { result }
        }

        fn set_switch_toggle(
            &self,
            identifier: &DeviceIdentifier,
        ) -> impl Future<Output = Result<(), BridgeError>> + Send {
            let result = self.record(
                Command::Toggle(identifier.as_str().to_string()),
                "setswitchtoggle",
            );
            async { result }
        }
    }

    fn registry() -> Arc<ItemRegistry> {
        Arc::new(ItemRegistry::from_config(&[
            DeviceItemConfig {
                path: "living.heater".to_string(),
                ain: "AIN2".to_string(),
                items: vec![
                    AttributeItemConfig {
                        path: Some("living.heater.setpoint".to_string()),
                        attribute: "set_temperature".to_string(),
                        update_request: false,
                    },
                    AttributeItemConfig {
                        path: Some("living.heater.switch".to_string()),
                        attribute: "set_switch_state".to_string(),
                        update_request: false,
                    },
                    AttributeItemConfig {
                        path: Some("living.heater.toggle".to_string()),
                        attribute: "set_switch_state_toggle".to_string(),
                        update_request: false,
                    },
                    AttributeItemConfig {
                        path: Some("living.heater.temp".to_string()),
                        attribute: "temperature".to_string(),
                        update_request: false,
                    },
                    AttributeItemConfig {
                        path: Some("living.refresh".to_string()),
                        attribute: "present".to_string(),
                        update_request: true,
                    },
                ],
            },
            DeviceItemConfig {
                path: "broken".to_string(),
                ain: String::new(),
                items: vec![AttributeItemConfig {
                    path: Some("broken.setpoint".to_string()),
                    attribute: "set_temperature".to_string(),
                    update_request: false,
                }],
            },
        ]))
    }

    struct Harness {
        dispatcher: CommandDispatcher<RecordingGateway>,
        gateway: Arc<RecordingGateway>,
        live: Arc<AtomicBool>,
        poll_trigger: Arc<Notify>,
    }

    fn harness_with(gateway: RecordingGateway) -> Harness {
        let gateway = Arc::new(gateway);
        let live = Arc::new(AtomicBool::new(true));
        let poll_trigger = Arc::new(Notify::new());
        Harness {
            dispatcher: CommandDispatcher::new(
                Arc::clone(&gateway),
                registry(),
                Arc::clone(&live),
                Arc::clone(&poll_trigger),
            ),
            gateway,
            live,
            poll_trigger,
        }
    }

    fn harness() -> Harness {
        harness_with(RecordingGateway::default())
    }

    fn external(path: &str, value: ItemValue) -> ItemEvent {
        ItemEvent {
            path: ItemPath::from(path),
            value,
            caller: Caller::External("test".to_string()),
        }
    }

    #[tokio::test]
    async fn should_issue_set_target_temperature_exactly_once() {
        let h = harness();
        h.dispatcher
            .handle_event(&external("living.heater.setpoint", ItemValue::Float(22.0)))
            .await;

        assert_eq!(
            h.gateway.commands(),
            vec![Command::Target("AIN2".to_string(), 22.0)]
        );
    }

    #[tokio::test]
    async fn should_never_dispatch_bridge_attributed_writes() {
        let h = harness();
        h.dispatcher
            .handle_event(&ItemEvent {
                path: ItemPath::from("living.heater.setpoint"),
                value: ItemValue::Float(22.0),
                caller: Caller::Bridge,
            })
            .await;

        assert!(h.gateway.commands().is_empty());
    }

    #[tokio::test]
    async fn should_switch_on_for_true_and_off_for_false() {
        let h = harness();
        h.dispatcher
            .handle_event(&external("living.heater.switch", ItemValue::Bool(true)))
            .await;
        h.dispatcher
            .handle_event(&external("living.heater.switch", ItemValue::Bool(false)))
            .await;

        assert_eq!(
            h.gateway.commands(),
            vec![Command::On("AIN2".to_string()), Command::Off("AIN2".to_string())]
        );
    }

    #[tokio::test]
    async fn should_toggle_once_regardless_of_carried_value() {
        let h = harness();
        for value in [ItemValue::Bool(true), ItemValue::Bool(false)] {
            h.dispatcher
                .handle_event(&external("living.heater.toggle", value))
                .await;
        }

        assert_eq!(
            h.gateway.commands(),
            vec![
                Command::Toggle("AIN2".to_string()),
                Command::Toggle("AIN2".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn should_issue_no_command_when_identifier_is_missing() {
        let h = harness();
        h.dispatcher
            .handle_event(&external("broken.setpoint", ItemValue::Float(22.0)))
            .await;

        assert!(h.gateway.commands().is_empty());
    }

    #[tokio::test]
    async fn should_ignore_writes_to_telemetry_only_items() {
        let h = harness();
        h.dispatcher
            .handle_event(&external("living.heater.temp", ItemValue::Float(25.0)))
            .await;

        assert!(h.gateway.commands().is_empty());
    }

    #[tokio::test]
    async fn should_ignore_writes_while_not_live() {
        let h = harness();
        h.live.store(false, Ordering::SeqCst);
        h.dispatcher
            .handle_event(&external("living.heater.setpoint", ItemValue::Float(22.0)))
            .await;

        assert!(h.gateway.commands().is_empty());
    }

    #[tokio::test]
    async fn should_issue_no_command_for_non_numeric_setpoint() {
        let h = harness();
        h.dispatcher
            .handle_event(&external(
                "living.heater.setpoint",
                ItemValue::from("warm"),
            ))
            .await;

        assert!(h.gateway.commands().is_empty());
    }

    #[tokio::test]
    async fn should_fire_poll_trigger_for_update_request_item() {
        let h = harness();
        h.dispatcher
            .handle_event(&external("living.refresh", ItemValue::Bool(true)))
            .await;

        // notify_one stores a permit, so this resolves immediately.
        tokio::time::timeout(Duration::from_millis(100), h.poll_trigger.notified())
            .await
            .expect("trigger should have fired");
        assert!(h.gateway.commands().is_empty());
    }

    #[tokio::test]
    async fn should_log_and_swallow_rejected_commands() {
        let h = harness_with(RecordingGateway::rejecting());
        h.dispatcher
            .handle_event(&external("living.heater.setpoint", ItemValue::Float(22.0)))
            .await;

        assert!(h.gateway.commands().is_empty());
    }

    #[tokio::test]
    async fn should_dispatch_events_received_over_the_bus() {
        let h = harness();
        let bus = crate::item_bus::ItemEventBus::new(16);
        let rx = bus.subscribe();
        let task = tokio::spawn(h.dispatcher.run(rx));

        bus.publish(external("living.heater.setpoint", ItemValue::Float(21.0)));
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(
            h.gateway.commands(),
            vec![Command::Target("AIN2".to_string(), 21.0)]
        );
        drop(bus);
        let _ = tokio::time::timeout(Duration::from_secs(1), task).await;
    }
}
