//! In-memory stock ledger.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use common::ProductId;

use crate::error::LedgerError;
use crate::ledger::{StockLedger, validate_quantity};
use crate::stock::Stock;

/// In-memory ledger backed by a single map guarded by a lock.
///
/// The whole read-modify-write runs inside one critical section, which gives
/// the per-row atomicity the contract requires. Used by tests and by
/// single-process wiring.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStockLedger {
    rows: Arc<RwLock<HashMap<ProductId, Stock>>>,
}

impl InMemoryStockLedger {
    /// Creates a new empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a ledger pre-seeded with the given rows.
    pub fn with_stock(rows: impl IntoIterator<Item = Stock>) -> Self {
        let ledger = Self::new();
        {
            let mut map = ledger.rows.write().unwrap();
            for stock in rows {
                map.insert(stock.product_id.clone(), stock);
            }
        }
        ledger
    }

    /// Returns the number of stock rows.
    pub fn row_count(&self) -> usize {
        self.rows.read().unwrap().len()
    }
}

#[async_trait]
impl StockLedger for InMemoryStockLedger {
    async fn get_stock(&self, product_id: &ProductId) -> Result<Stock, LedgerError> {
        self.rows
            .read()
            .unwrap()
            .get(product_id)
            .cloned()
            .ok_or_else(|| LedgerError::NotFound(product_id.clone()))
    }

    async fn reserve(&self, product_id: &ProductId, quantity: u32) -> Result<Stock, LedgerError> {
        validate_quantity(product_id, quantity)?;

        let mut rows = self.rows.write().unwrap();
        let stock = rows
            .get_mut(product_id)
            .ok_or_else(|| LedgerError::NotFound(product_id.clone()))?;

        if stock.quantity_available < quantity {
            metrics::counter!("ledger_reserve_conflicts_total").increment(1);
            return Err(LedgerError::InsufficientStock {
                product_id: product_id.clone(),
                available: stock.quantity_available,
                requested: quantity,
            });
        }

        stock.quantity_available -= quantity;
        stock.quantity_reserved += quantity;
        stock.updated_at = Utc::now();

        metrics::counter!("ledger_reservations_total").increment(1);
        tracing::debug!(%product_id, quantity, available = stock.quantity_available, "stock reserved");
        Ok(stock.clone())
    }

    async fn release(&self, product_id: &ProductId, quantity: u32) -> Result<Stock, LedgerError> {
        validate_quantity(product_id, quantity)?;

        let mut rows = self.rows.write().unwrap();
        let stock = rows
            .get_mut(product_id)
            .ok_or_else(|| LedgerError::NotFound(product_id.clone()))?;

        if stock.quantity_reserved < quantity {
            return Err(LedgerError::OverRelease {
                product_id: product_id.clone(),
                reserved: stock.quantity_reserved,
                requested: quantity,
            });
        }

        stock.quantity_reserved -= quantity;
        stock.quantity_available += quantity;
        stock.updated_at = Utc::now();

        metrics::counter!("ledger_releases_total").increment(1);
        tracing::debug!(%product_id, quantity, available = stock.quantity_available, "stock released");
        Ok(stock.clone())
    }

    async fn adjust_available(
        &self,
        product_id: &ProductId,
        delta: i64,
        reason: &str,
    ) -> Result<Stock, LedgerError> {
        let mut rows = self.rows.write().unwrap();
        let stock = rows
            .get_mut(product_id)
            .ok_or_else(|| LedgerError::NotFound(product_id.clone()))?;

        let adjusted = stock.quantity_available as i64 + delta;
        if adjusted < 0 || adjusted > u32::MAX as i64 {
            return Err(LedgerError::WouldGoNegative {
                product_id: product_id.clone(),
                available: stock.quantity_available,
                delta,
            });
        }

        stock.quantity_available = adjusted as u32;
        stock.updated_at = Utc::now();

        tracing::info!(%product_id, delta, reason, available = stock.quantity_available, "stock adjusted");
        Ok(stock.clone())
    }

    async fn put_stock(&self, stock: Stock) -> Result<(), LedgerError> {
        self.rows
            .write()
            .unwrap()
            .insert(stock.product_id.clone(), stock);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger_with(product: &str, available: u32) -> InMemoryStockLedger {
        InMemoryStockLedger::with_stock([Stock::new(product, available)])
    }

    #[tokio::test]
    async fn reserve_moves_units_to_reserved() {
        let ledger = ledger_with("SKU-001", 5);
        let product = ProductId::new("SKU-001");

        let stock = ledger.reserve(&product, 3).await.unwrap();
        assert_eq!(stock.quantity_available, 2);
        assert_eq!(stock.quantity_reserved, 3);
        assert_eq!(stock.total_units(), 5);
    }

    #[tokio::test]
    async fn reserve_then_release_restores_counters() {
        let ledger = ledger_with("SKU-001", 5);
        let product = ProductId::new("SKU-001");

        ledger.reserve(&product, 4).await.unwrap();
        let stock = ledger.release(&product, 4).await.unwrap();

        assert_eq!(stock.quantity_available, 5);
        assert_eq!(stock.quantity_reserved, 0);
    }

    #[tokio::test]
    async fn insufficient_stock_leaves_row_untouched() {
        let ledger = ledger_with("SKU-001", 2);
        let product = ProductId::new("SKU-001");

        let err = ledger.reserve(&product, 3).await.unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InsufficientStock {
                available: 2,
                requested: 3,
                ..
            }
        ));

        let stock = ledger.get_stock(&product).await.unwrap();
        assert_eq!(stock.quantity_available, 2);
        assert_eq!(stock.quantity_reserved, 0);
    }

    #[tokio::test]
    async fn over_release_is_rejected() {
        let ledger = ledger_with("SKU-001", 5);
        let product = ProductId::new("SKU-001");

        ledger.reserve(&product, 2).await.unwrap();
        let err = ledger.release(&product, 3).await.unwrap_err();
        assert!(matches!(
            err,
            LedgerError::OverRelease {
                reserved: 2,
                requested: 3,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn zero_quantity_is_rejected() {
        let ledger = ledger_with("SKU-001", 5);
        let product = ProductId::new("SKU-001");

        assert!(matches!(
            ledger.reserve(&product, 0).await,
            Err(LedgerError::InvalidQuantity { .. })
        ));
        assert!(matches!(
            ledger.release(&product, 0).await,
            Err(LedgerError::InvalidQuantity { .. })
        ));
    }

    #[tokio::test]
    async fn unknown_product_is_not_found() {
        let ledger = InMemoryStockLedger::new();
        let product = ProductId::new("SKU-404");

        assert!(matches!(
            ledger.get_stock(&product).await,
            Err(LedgerError::NotFound(_))
        ));
        assert!(matches!(
            ledger.reserve(&product, 1).await,
            Err(LedgerError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn adjust_available_ignores_reservations() {
        let ledger = ledger_with("SKU-001", 5);
        let product = ProductId::new("SKU-001");

        ledger.reserve(&product, 3).await.unwrap();
        let stock = ledger
            .adjust_available(&product, 10, "restock")
            .await
            .unwrap();

        assert_eq!(stock.quantity_available, 12);
        assert_eq!(stock.quantity_reserved, 3);
    }

    #[tokio::test]
    async fn adjust_below_zero_is_rejected() {
        let ledger = ledger_with("SKU-001", 5);
        let product = ProductId::new("SKU-001");

        let err = ledger
            .adjust_available(&product, -6, "shrinkage")
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::WouldGoNegative { delta: -6, .. }));

        let stock = ledger.get_stock(&product).await.unwrap();
        assert_eq!(stock.quantity_available, 5);
    }

    #[tokio::test]
    async fn adjust_above_counter_max_is_rejected() {
        let ledger = ledger_with("SKU-001", 10);
        let product = ProductId::new("SKU-001");

        let err = ledger
            .adjust_available(&product, u32::MAX as i64, "bulk restock")
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::WouldGoNegative { .. }));

        let stock = ledger.get_stock(&product).await.unwrap();
        assert_eq!(stock.quantity_available, 10);
    }

    #[tokio::test]
    async fn concurrent_reserves_never_oversell() {
        let ledger = ledger_with("SKU-001", 30);
        let product = ProductId::new("SKU-001");

        let mut handles = Vec::new();
        for _ in 0..50 {
            let ledger = ledger.clone();
            let product = product.clone();
            handles.push(tokio::spawn(
                async move { ledger.reserve(&product, 1).await },
            ));
        }

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                successes += 1;
            }
        }

        assert_eq!(successes, 30);
        let stock = ledger.get_stock(&product).await.unwrap();
        assert_eq!(stock.quantity_available, 0);
        assert_eq!(stock.quantity_reserved, 30);
    }
}
