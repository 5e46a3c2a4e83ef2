//! Order aggregate with immutable item snapshots.

use chrono::{DateTime, Utc};
use common::{OrderId, ProductId, UserId};
use serde::{Deserialize, Serialize};

use crate::error::OrderError;
use crate::money::Money;
use crate::status::OrderStatus;

/// A line item in an order.
///
/// Name and price are snapshots taken when the order is created; later
/// catalog changes do not affect them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// The product identifier.
    pub product_id: ProductId,

    /// Product name at creation time.
    pub product_name: String,

    /// Price per unit at creation time.
    pub unit_price: Money,

    /// Quantity ordered.
    pub quantity: u32,
}

impl OrderItem {
    /// Creates a new order item snapshot.
    pub fn new(
        product_id: impl Into<ProductId>,
        product_name: impl Into<String>,
        unit_price: Money,
        quantity: u32,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            product_name: product_name.into(),
            unit_price,
            quantity,
        }
    }

    /// Returns the subtotal for this item (unit price times quantity).
    pub fn subtotal(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// Order aggregate root.
///
/// The unit of persistence and concurrency: callers are expected to be the
/// single writer for a given order ID. Created only after every item's
/// reservation succeeded; cancellation is a status transition, never a
/// delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    owner_id: UserId,
    status: OrderStatus,
    items: Vec<OrderItem>,
    total_amount: Money,
    shipping_address: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Creates a new order in `Pending` status.
    ///
    /// Rejects an empty item list and zero quantities; computes the total
    /// from the item snapshots.
    pub fn new(
        owner_id: UserId,
        items: Vec<OrderItem>,
        shipping_address: Option<String>,
        notes: Option<String>,
    ) -> Result<Self, OrderError> {
        if items.is_empty() {
            return Err(OrderError::EmptyOrder);
        }

        if let Some(item) = items.iter().find(|item| item.quantity == 0) {
            return Err(OrderError::InvalidQuantity {
                product_id: item.product_id.clone(),
            });
        }

        let total_amount = items.iter().map(OrderItem::subtotal).sum();

        Ok(Self {
            id: OrderId::new(),
            owner_id,
            status: OrderStatus::Pending,
            items,
            total_amount,
            shipping_address,
            notes,
            created_at: Utc::now(),
            updated_at: None,
        })
    }

    /// Transitions the order to a new status.
    ///
    /// Illegal transitions leave the order untouched and return
    /// [`OrderError::InvalidTransition`].
    pub fn transition_to(&mut self, to: OrderStatus) -> Result<(), OrderError> {
        if !self.status.can_transition_to(to) {
            return Err(OrderError::InvalidTransition {
                from: self.status,
                to,
            });
        }

        self.status = to;
        self.updated_at = Some(Utc::now());
        Ok(())
    }

    /// Cancels the order (legal from `Pending` and `Confirmed` only).
    pub fn cancel(&mut self) -> Result<(), OrderError> {
        self.transition_to(OrderStatus::Cancelled)
    }
}

// Query methods
impl Order {
    /// Returns the order ID.
    pub fn id(&self) -> OrderId {
        self.id
    }

    /// Returns the principal that created the order.
    pub fn owner_id(&self) -> UserId {
        self.owner_id
    }

    /// Returns the current status.
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Returns the item snapshots.
    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    /// Returns the total amount across all items.
    pub fn total_amount(&self) -> Money {
        self.total_amount
    }

    /// Returns the shipping address, if any.
    pub fn shipping_address(&self) -> Option<&str> {
        self.shipping_address.as_deref()
    }

    /// Returns the notes, if any.
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// Returns when the order was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the order was last updated, if ever.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Returns true if the order is in a terminal status.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_items() -> Vec<OrderItem> {
        vec![
            OrderItem::new("SKU-001", "Widget", Money::from_cents(1000), 2),
            OrderItem::new("SKU-002", "Gadget", Money::from_cents(2500), 1),
        ]
    }

    #[test]
    fn test_new_order_is_pending_with_total() {
        let owner = UserId::new();
        let order = Order::new(owner, two_items(), Some("1 Main St".into()), None).unwrap();

        assert_eq!(order.owner_id(), owner);
        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.items().len(), 2);
        assert_eq!(order.total_amount().cents(), 4500);
        assert_eq!(order.shipping_address(), Some("1 Main St"));
        assert!(order.updated_at().is_none());
    }

    #[test]
    fn test_empty_order_is_rejected() {
        let result = Order::new(UserId::new(), vec![], None, None);
        assert!(matches!(result, Err(OrderError::EmptyOrder)));
    }

    #[test]
    fn test_zero_quantity_is_rejected() {
        let items = vec![OrderItem::new(
            "SKU-001",
            "Widget",
            Money::from_cents(1000),
            0,
        )];
        let result = Order::new(UserId::new(), items, None, None);
        assert!(matches!(result, Err(OrderError::InvalidQuantity { .. })));
    }

    #[test]
    fn test_item_subtotal() {
        let item = OrderItem::new("SKU-001", "Widget", Money::from_cents(1000), 3);
        assert_eq!(item.subtotal().cents(), 3000);
    }

    #[test]
    fn test_cancel_from_pending() {
        let mut order = Order::new(UserId::new(), two_items(), None, None).unwrap();

        order.cancel().unwrap();
        assert_eq!(order.status(), OrderStatus::Cancelled);
        assert!(order.updated_at().is_some());
        assert!(order.is_terminal());
    }

    #[test]
    fn test_full_forward_progression() {
        let mut order = Order::new(UserId::new(), two_items(), None, None).unwrap();

        order.transition_to(OrderStatus::Confirmed).unwrap();
        order.transition_to(OrderStatus::Processing).unwrap();
        order.transition_to(OrderStatus::Shipped).unwrap();
        order.transition_to(OrderStatus::Delivered).unwrap();

        assert_eq!(order.status(), OrderStatus::Delivered);
        assert!(order.is_terminal());
    }

    #[test]
    fn test_illegal_transition_leaves_status_unchanged() {
        let mut order = Order::new(UserId::new(), two_items(), None, None).unwrap();

        let err = order.transition_to(OrderStatus::Shipped).unwrap_err();
        assert!(matches!(
            err,
            OrderError::InvalidTransition {
                from: OrderStatus::Pending,
                to: OrderStatus::Shipped
            }
        ));
        assert_eq!(order.status(), OrderStatus::Pending);
        assert!(order.updated_at().is_none());
    }

    #[test]
    fn test_cancel_shipped_order_fails() {
        let mut order = Order::new(UserId::new(), two_items(), None, None).unwrap();
        order.transition_to(OrderStatus::Confirmed).unwrap();
        order.transition_to(OrderStatus::Processing).unwrap();
        order.transition_to(OrderStatus::Shipped).unwrap();

        let result = order.cancel();
        assert!(matches!(result, Err(OrderError::InvalidTransition { .. })));
        assert_eq!(order.status(), OrderStatus::Shipped);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let order = Order::new(UserId::new(), two_items(), None, Some("gift".into())).unwrap();

        let json = serde_json::to_string(&order).unwrap();
        let deserialized: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(order, deserialized);
    }
}
