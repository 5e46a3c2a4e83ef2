//! Event publisher trait and implementations.

use std::sync::{Arc, RwLock};

use tokio::sync::mpsc;

use crate::event::{EventEnvelope, IntegrationEvent};

/// Fire-and-forget publisher for integration events.
///
/// `publish` returns once the event is enqueued; delivery is at-least-once
/// and asynchronous. Failures are logged and counted, never surfaced to the
/// caller, and never roll back the local state change that triggered the
/// event.
pub trait EventPublisher: Send + Sync {
    /// Enqueues an event for delivery.
    fn publish(&self, event: IntegrationEvent);
}

/// Publisher backed by an unbounded channel.
///
/// The receiving half belongs to the notification consumer (out of scope
/// here); if it is gone, events are dropped with a warning.
#[derive(Debug, Clone)]
pub struct ChannelPublisher {
    tx: mpsc::UnboundedSender<EventEnvelope>,
}

impl ChannelPublisher {
    /// Creates a publisher and the receiving end of its channel.
    pub fn pair() -> (Self, mpsc::UnboundedReceiver<EventEnvelope>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventPublisher for ChannelPublisher {
    fn publish(&self, event: IntegrationEvent) {
        let envelope = EventEnvelope::new(event);
        let event_type = envelope.event.event_type();

        match self.tx.send(envelope) {
            Ok(()) => {
                metrics::counter!("integration_events_published_total").increment(1);
                tracing::debug!(event_type, "integration event enqueued");
            }
            Err(err) => {
                metrics::counter!("integration_events_dropped_total").increment(1);
                tracing::warn!(event_type, event_id = %err.0.event_id, "event channel closed, event dropped");
            }
        }
    }
}

/// Test publisher that records every published envelope.
#[derive(Debug, Clone, Default)]
pub struct RecordingPublisher {
    events: Arc<RwLock<Vec<EventEnvelope>>>,
}

impl RecordingPublisher {
    /// Creates a new empty recording publisher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all published envelopes.
    pub fn published(&self) -> Vec<EventEnvelope> {
        self.events.read().unwrap().clone()
    }

    /// Returns the number of published events.
    pub fn event_count(&self) -> usize {
        self.events.read().unwrap().len()
    }

    /// Returns the published events of the given type.
    pub fn of_type(&self, event_type: &str) -> Vec<EventEnvelope> {
        self.events
            .read()
            .unwrap()
            .iter()
            .filter(|envelope| envelope.event.event_type() == event_type)
            .cloned()
            .collect()
    }
}

impl EventPublisher for RecordingPublisher {
    fn publish(&self, event: IntegrationEvent) {
        self.events
            .write()
            .unwrap()
            .push(EventEnvelope::new(event));
    }
}

/// Publisher that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPublisher;

impl EventPublisher for NoopPublisher {
    fn publish(&self, _event: IntegrationEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::UserId;

    #[tokio::test]
    async fn channel_publisher_delivers_envelopes() {
        let (publisher, mut rx) = ChannelPublisher::pair();
        let user_id = UserId::new();

        publisher.publish(IntegrationEvent::UserRegistered { user_id });

        let envelope = rx.recv().await.unwrap();
        assert_eq!(envelope.event.event_type(), "UserRegistered");
        assert_eq!(
            envelope.event,
            IntegrationEvent::UserRegistered { user_id }
        );
    }

    #[tokio::test]
    async fn channel_publisher_survives_closed_receiver() {
        let (publisher, rx) = ChannelPublisher::pair();
        drop(rx);

        // Must not panic or error
        publisher.publish(IntegrationEvent::UserRegistered {
            user_id: UserId::new(),
        });
    }

    #[test]
    fn recording_publisher_captures_by_type() {
        let publisher = RecordingPublisher::new();

        publisher.publish(IntegrationEvent::UserRegistered {
            user_id: UserId::new(),
        });
        publisher.publish(IntegrationEvent::UserRegistered {
            user_id: UserId::new(),
        });

        assert_eq!(publisher.event_count(), 2);
        assert_eq!(publisher.of_type("UserRegistered").len(), 2);
        assert!(publisher.of_type("OrderCreated").is_empty());
    }
}
