//! Stock ledger trait.

use async_trait::async_trait;
use common::ProductId;

use crate::error::LedgerError;
use crate::stock::Stock;

/// Contract for the inventory ledger.
///
/// Every method executes as a single atomic read-modify-write against one
/// product row. Implementations must guarantee that concurrent calls for
/// the same product serialize at the row level.
#[async_trait]
pub trait StockLedger: Send + Sync {
    /// Loads the stock row for a product.
    async fn get_stock(&self, product_id: &ProductId) -> Result<Stock, LedgerError>;

    /// Moves `quantity` units from available to reserved.
    ///
    /// Fails with [`LedgerError::InsufficientStock`] when fewer units are
    /// available than requested, leaving the row untouched.
    async fn reserve(&self, product_id: &ProductId, quantity: u32) -> Result<Stock, LedgerError>;

    /// Moves `quantity` units from reserved back to available.
    ///
    /// Fails with [`LedgerError::OverRelease`] when fewer units are reserved
    /// than requested, leaving the row untouched.
    async fn release(&self, product_id: &ProductId, quantity: u32) -> Result<Stock, LedgerError>;

    /// Administrative correction of the available counter.
    ///
    /// Independent of reservation state; the reason is recorded in the log.
    async fn adjust_available(
        &self,
        product_id: &ProductId,
        delta: i64,
        reason: &str,
    ) -> Result<Stock, LedgerError>;

    /// Inserts or replaces a stock row (provisioning/seeding).
    async fn put_stock(&self, stock: Stock) -> Result<(), LedgerError>;
}

/// Rejects zero quantities before any row is touched.
pub(crate) fn validate_quantity(product_id: &ProductId, quantity: u32) -> Result<(), LedgerError> {
    if quantity == 0 {
        return Err(LedgerError::InvalidQuantity {
            product_id: product_id.clone(),
        });
    }
    Ok(())
}
