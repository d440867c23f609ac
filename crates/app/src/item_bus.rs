//! In-process item event bus backed by a tokio broadcast channel.
//!
//! Every item write — engine telemetry or external command — is published
//! here. The command dispatch engine is a subscriber; the poll cycle
//! engine is a publisher (with [`Caller::Bridge`]).

use tokio::sync::broadcast;

use fritzsync_domain::identifier::ItemPath;
use fritzsync_domain::item::Caller;
use fritzsync_domain::value::ItemValue;

/// One item write, carried over the bus.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemEvent {
    /// Path of the written item.
    pub path: ItemPath,
    /// The new value.
    pub value: ItemValue,
    /// Who caused the write.
    pub caller: Caller,
}

/// In-process item event bus using a tokio [`broadcast`] channel.
///
/// Publishing succeeds even when there are no active subscribers
/// (the event is simply dropped).
#[derive(Debug, Clone)]
pub struct ItemEventBus {
    sender: broadcast::Sender<ItemEvent>,
}

impl ItemEventBus {
    /// Create a new bus with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to item events.
    ///
    /// Returns a receiver that will get all events published *after*
    /// the subscription is created.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ItemEvent> {
        self.sender.subscribe()
    }

    /// Publish an item write.
    pub fn publish(&self, event: ItemEvent) {
        // broadcast::send fails only when there are zero receivers,
        // which is fine — we simply ignore the error.
        let _ = self.sender.send(event);
    }
}

impl Default for ItemEventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(caller: Caller) -> ItemEvent {
        ItemEvent {
            path: ItemPath::from("living.heater.setpoint"),
            value: ItemValue::Float(22.0),
            caller,
        }
    }

    #[tokio::test]
    async fn should_deliver_event_to_subscriber() {
        let bus = ItemEventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(event(Caller::Bridge));

        let received = rx.recv().await.unwrap();
        assert_eq!(received.caller, Caller::Bridge);
        assert_eq!(received.value, ItemValue::Float(22.0));
    }

    #[tokio::test]
    async fn should_deliver_event_to_multiple_subscribers() {
        let bus = ItemEventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(event(Caller::External("api".to_string())));

        assert_eq!(rx1.recv().await.unwrap(), rx2.recv().await.unwrap());
    }

    #[tokio::test]
    async fn should_succeed_when_no_subscribers() {
        let bus = ItemEventBus::new(16);
        bus.publish(event(Caller::Bridge));
    }

    #[tokio::test]
    async fn should_not_deliver_events_published_before_subscription() {
        let bus = ItemEventBus::new(16);
        bus.publish(event(Caller::Bridge));

        let mut rx = bus.subscribe();
        bus.publish(event(Caller::External("late".to_string())));

        let received = rx.recv().await.unwrap();
        assert_eq!(received.caller, Caller::External("late".to_string()));
    }
}
