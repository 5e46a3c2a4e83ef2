//! Saga error types.

use common::{OrderId, ProductId};
use domain::{OrderError, RepositoryError};
use thiserror::Error;

/// Errors that can occur during saga execution.
///
/// The taxonomy mirrors how each failure is handled: validation errors are
/// rejected before any remote call; conflict and unavailability abort the
/// run and trigger compensation for reservations already held; access and
/// transition rejections have no side effects to undo.
#[derive(Debug, Error)]
pub enum SagaError {
    /// An order must contain at least one item.
    #[error("Order must contain at least one item")]
    EmptyOrder,

    /// Item quantities must be positive.
    #[error("Invalid quantity for product {0}")]
    InvalidQuantity(ProductId),

    /// The product is missing from the catalog or not active.
    #[error("Product {0} is unavailable")]
    ProductUnavailable(ProductId),

    /// Not enough stock to reserve; carries the product's display name.
    #[error("Insufficient stock for {0}")]
    InsufficientStock(String),

    /// The catalog/inventory service could not be reached.
    #[error("Catalog unreachable: {0}")]
    CatalogUnreachable(String),

    /// Order not found.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// The principal may not act on this order.
    #[error("Access denied")]
    AccessDenied,

    /// Order aggregate error.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// Order persistence error.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Convenience type alias for saga results.
pub type Result<T> = std::result::Result<T, SagaError>;
