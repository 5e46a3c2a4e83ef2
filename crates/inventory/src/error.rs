//! Ledger error types.

use common::ProductId;
use thiserror::Error;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// No stock row exists for the product.
    #[error("No stock record for product {0}")]
    NotFound(ProductId),

    /// Fewer units available than requested.
    #[error("Insufficient stock for product {product_id}: {available} available, {requested} requested")]
    InsufficientStock {
        product_id: ProductId,
        available: u32,
        requested: u32,
    },

    /// Attempted to release more units than are reserved.
    #[error("Over-release for product {product_id}: {reserved} reserved, {requested} requested")]
    OverRelease {
        product_id: ProductId,
        reserved: u32,
        requested: u32,
    },

    /// An adjustment would push the available counter out of range.
    #[error("Adjustment of {delta} would push product {product_id} out of range ({available} available)")]
    WouldGoNegative {
        product_id: ProductId,
        available: u32,
        delta: i64,
    },

    /// Reserve/release quantities must be positive.
    #[error("Quantity must be positive for product {product_id}")]
    InvalidQuantity { product_id: ProductId },

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
