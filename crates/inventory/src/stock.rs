//! Stock row owned by the inventory ledger.

use chrono::{DateTime, Utc};
use common::ProductId;
use serde::{Deserialize, Serialize};

/// Per-product stock counters.
///
/// Both counters are unsigned by construction; `quantity_available +
/// quantity_reserved` is the total number of units owned and only changes
/// through an explicit adjustment, never through reserve/release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    /// The product this row belongs to.
    pub product_id: ProductId,

    /// Units free to be reserved.
    pub quantity_available: u32,

    /// Units held by pending orders.
    pub quantity_reserved: u32,

    /// When the row was last mutated.
    pub updated_at: DateTime<Utc>,
}

impl Stock {
    /// Creates a fresh stock row with the given available quantity.
    pub fn new(product_id: impl Into<ProductId>, quantity_available: u32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity_available,
            quantity_reserved: 0,
            updated_at: Utc::now(),
        }
    }

    /// Total units owned, reserved or not.
    pub fn total_units(&self) -> u64 {
        self.quantity_available as u64 + self.quantity_reserved as u64
    }
}
