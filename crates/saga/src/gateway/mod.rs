//! Inventory gateway: the order side view of the inventory service.
//!
//! Every call is a single attempt with per-call success/failure semantics;
//! failures are logged by the implementations, never silently retried. The
//! caller decides whether a failure escalates.

pub mod http;
pub mod local;

use async_trait::async_trait;
use common::ProductId;
use domain::Money;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use http::HttpInventoryGateway;
pub use local::LocalInventoryGateway;

/// Product details as seen by the order side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductInfo {
    /// Display name.
    pub name: String,
    /// Current unit price.
    pub unit_price: Money,
    /// False when the product has been withdrawn from sale.
    pub is_active: bool,
}

/// Errors surfaced by gateway calls.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The product does not exist on the inventory side.
    #[error("Product not found: {0}")]
    NotFound(ProductId),

    /// The request was understood but refused (insufficient stock,
    /// over-release).
    #[error("Conflict for product {product_id}: {detail}")]
    Conflict { product_id: ProductId, detail: String },

    /// Transport-level failure: connection refused, timeout, 5xx.
    #[error("Inventory service unavailable: {0}")]
    Unavailable(String),
}

/// Remote-call abstraction over the inventory service.
#[async_trait]
pub trait InventoryGateway: Send + Sync {
    /// Fetches product name, price, and active flag.
    async fn fetch_product(&self, product_id: &ProductId) -> Result<ProductInfo, GatewayError>;

    /// Reserves `quantity` units of a product.
    async fn reserve_stock(&self, product_id: &ProductId, quantity: u32)
    -> Result<(), GatewayError>;

    /// Releases `quantity` previously reserved units.
    ///
    /// Failures are reported to the caller, who decides whether to
    /// escalate; compensation paths typically log and continue.
    async fn release_stock(&self, product_id: &ProductId, quantity: u32)
    -> Result<(), GatewayError>;
}
