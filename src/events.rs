//! In-process event bus carrying drag-and-drop notifications.
//!
//! The drag source publishes a [`DropEvent`] when a talk lands on a slot; the
//! slot editor owns a receiver and applies pending events on its own task.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::models::Talk;

/// Buffer capacity of the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// A talk dropped onto a slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropEvent {
    pub dragged: Talk,
    pub target_slot_id: String,
}

impl DropEvent {
    pub fn new(dragged: Talk, target_slot_id: impl Into<String>) -> Self {
        Self {
            dragged,
            target_slot_id: target_slot_id.into(),
        }
    }
}

/// Fan-out bus for [`DropEvent`]s.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<DropEvent>,
}

impl EventBus {
    /// When the buffer is full the oldest events are dropped and slow
    /// receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish to all current subscribers. Dropped silently when nobody listens.
    pub fn publish(&self, event: DropEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DropEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_receive() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(DropEvent::new(Talk::new("42"), "3"));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.dragged.id.as_str(), "42");
        assert_eq!(event.target_slot_id, "3");
    }

    #[test]
    fn publish_without_subscribers_does_not_panic() {
        let bus = EventBus::default();
        bus.publish(DropEvent::new(Talk::new("1"), "1"));
    }

    #[tokio::test]
    async fn every_subscriber_sees_every_event() {
        let bus = EventBus::default();
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        bus.publish(DropEvent::new(Talk::new("1"), "1"));
        bus.publish(DropEvent::new(Talk::new("2"), "2"));

        for rx in [&mut a, &mut b] {
            assert_eq!(rx.recv().await.unwrap().target_slot_id, "1");
            assert_eq!(rx.recv().await.unwrap().target_slot_id, "2");
        }
    }

    #[tokio::test]
    async fn slow_receiver_lags() {
        let bus = EventBus::new(2);
        let mut rx = bus.subscribe();
        for n in 0..4u64 {
            bus.publish(DropEvent::new(Talk::new(n), "1"));
        }
        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(_))
        ));
    }
}
