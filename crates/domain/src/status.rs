//! Order state machine.

use serde::{Deserialize, Serialize};

/// The status of an order in its lifecycle.
///
/// Legal transitions:
/// ```text
/// Pending ──► Confirmed ──► Processing ──► Shipped ──► Delivered
///    │            │
///    └────────────┴──► Cancelled
/// ```
///
/// Anything not in this graph is rejected without mutating state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    /// Initial status: reservations held, awaiting confirmation.
    #[default]
    Pending,

    /// Order confirmed, still cancellable.
    Confirmed,

    /// Order is being prepared for shipment.
    Processing,

    /// Order has left the warehouse.
    Shipped,

    /// Order arrived (terminal state).
    Delivered,

    /// Order was cancelled (terminal state).
    Cancelled,
}

impl OrderStatus {
    /// Returns true if the transition `self → to` is in the legal graph.
    pub fn can_transition_to(&self, to: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, to),
            (Pending, Confirmed)
                | (Confirmed, Processing)
                | (Processing, Shipped)
                | (Shipped, Delivered)
                | (Pending, Cancelled)
                | (Confirmed, Cancelled)
        )
    }

    /// Returns true if the order can still be cancelled from this status.
    pub fn can_cancel(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Confirmed)
    }

    /// Returns true if this is a terminal status (no further transitions possible).
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Parses a status from its wire name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(OrderStatus::Pending),
            "Confirmed" => Some(OrderStatus::Confirmed),
            "Processing" => Some(OrderStatus::Processing),
            "Shipped" => Some(OrderStatus::Shipped),
            "Delivered" => Some(OrderStatus::Delivered),
            "Cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
