//! Domain error types.

use common::{OrderId, ProductId};
use thiserror::Error;

use crate::status::OrderStatus;

/// Errors that can occur in the order aggregate.
#[derive(Debug, Error)]
pub enum OrderError {
    /// An order must contain at least one item.
    #[error("Order must contain at least one item")]
    EmptyOrder,

    /// Item quantities must be positive.
    #[error("Invalid quantity for product {product_id}")]
    InvalidQuantity { product_id: ProductId },

    /// The requested status transition is not in the legal graph.
    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
}

/// Errors from the order persistence collaborator.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No order with the given ID.
    #[error("Order not found: {0}")]
    NotFound(OrderId),

    /// An order with the same ID was already inserted.
    #[error("Order already exists: {0}")]
    DuplicateOrder(OrderId),
}
