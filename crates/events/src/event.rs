//! Integration event types.

use chrono::{DateTime, Utc};
use common::{EventId, OrderId, ProductId, UserId};
use domain::Order;
use serde::{Deserialize, Serialize};

/// Item payload carried by order events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventItem {
    /// The product identifier.
    pub product_id: ProductId,
    /// Product name snapshot.
    pub product_name: String,
    /// Quantity ordered.
    pub quantity: u32,
}

/// Events published to the downstream notification consumer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum IntegrationEvent {
    /// A new user registered (emitted by the identity collaborator).
    UserRegistered {
        /// The registered user.
        user_id: UserId,
    },

    /// An order was created with all reservations held.
    OrderCreated {
        /// The new order.
        order_id: OrderId,
        /// The principal that created it.
        owner_id: UserId,
        /// Item snapshots.
        items: Vec<EventItem>,
    },

    /// An order was cancelled.
    OrderCancelled {
        /// The cancelled order.
        order_id: OrderId,
        /// The principal that owned it.
        owner_id: UserId,
        /// Item snapshots.
        items: Vec<EventItem>,
    },
}

impl IntegrationEvent {
    /// Builds an `OrderCreated` event from an order.
    pub fn order_created(order: &Order) -> Self {
        IntegrationEvent::OrderCreated {
            order_id: order.id(),
            owner_id: order.owner_id(),
            items: items_of(order),
        }
    }

    /// Builds an `OrderCancelled` event from an order.
    pub fn order_cancelled(order: &Order) -> Self {
        IntegrationEvent::OrderCancelled {
            order_id: order.id(),
            owner_id: order.owner_id(),
            items: items_of(order),
        }
    }

    /// Returns the event type name.
    pub fn event_type(&self) -> &'static str {
        match self {
            IntegrationEvent::UserRegistered { .. } => "UserRegistered",
            IntegrationEvent::OrderCreated { .. } => "OrderCreated",
            IntegrationEvent::OrderCancelled { .. } => "OrderCancelled",
        }
    }

    /// Returns the key the event ID is derived from.
    ///
    /// The key identifies the business operation, not the publish attempt,
    /// so retried publishes carry the same event ID.
    pub fn dedup_key(&self) -> String {
        match self {
            IntegrationEvent::UserRegistered { user_id } => {
                format!("{user_id}:{}", self.event_type())
            }
            IntegrationEvent::OrderCreated { order_id, .. }
            | IntegrationEvent::OrderCancelled { order_id, .. } => {
                format!("{order_id}:{}", self.event_type())
            }
        }
    }
}

fn items_of(order: &Order) -> Vec<EventItem> {
    order
        .items()
        .iter()
        .map(|item| EventItem {
            product_id: item.product_id.clone(),
            product_name: item.product_name.clone(),
            quantity: item.quantity,
        })
        .collect()
}

/// An integration event with its delivery metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Deterministic event ID (see [`IntegrationEvent::dedup_key`]).
    pub event_id: EventId,
    /// When the envelope was built.
    pub occurred_at: DateTime<Utc>,
    /// The event payload.
    pub event: IntegrationEvent,
}

impl EventEnvelope {
    /// Wraps an event, deriving its ID from the business operation.
    pub fn new(event: IntegrationEvent) -> Self {
        Self {
            event_id: EventId::derived(&event.dedup_key()),
            occurred_at: Utc::now(),
            event,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{Money, OrderItem};

    fn sample_order() -> Order {
        let items = vec![
            OrderItem::new("SKU-001", "Widget", Money::from_cents(1000), 2),
            OrderItem::new("SKU-002", "Gadget", Money::from_cents(500), 3),
        ];
        Order::new(UserId::new(), items, None, None).unwrap()
    }

    #[test]
    fn order_created_carries_item_snapshots() {
        let order = sample_order();
        let event = IntegrationEvent::order_created(&order);

        match &event {
            IntegrationEvent::OrderCreated {
                order_id,
                owner_id,
                items,
            } => {
                assert_eq!(*order_id, order.id());
                assert_eq!(*owner_id, order.owner_id());
                assert_eq!(items.len(), 2);
                assert_eq!(items[0].product_name, "Widget");
                assert_eq!(items[1].quantity, 3);
            }
            _ => panic!("wrong variant"),
        }
        assert_eq!(event.event_type(), "OrderCreated");
    }

    #[test]
    fn envelope_ids_are_stable_per_operation() {
        let order = sample_order();

        let first = EventEnvelope::new(IntegrationEvent::order_created(&order));
        let retry = EventEnvelope::new(IntegrationEvent::order_created(&order));
        assert_eq!(first.event_id, retry.event_id);

        let cancelled = EventEnvelope::new(IntegrationEvent::order_cancelled(&order));
        assert_ne!(first.event_id, cancelled.event_id);
    }

    #[test]
    fn serialization_is_tagged() {
        let order = sample_order();
        let envelope = EventEnvelope::new(IntegrationEvent::order_cancelled(&order));

        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["event"]["type"], "OrderCancelled");

        let back: EventEnvelope = serde_json::from_value(json).unwrap();
        assert_eq!(back, envelope);
    }
}
