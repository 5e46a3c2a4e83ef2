//! In-process gateway backed directly by a stock ledger.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::ProductId;
use inventory::{InMemoryStockLedger, LedgerError, StockLedger};

use super::{GatewayError, InventoryGateway, ProductInfo};

#[derive(Debug, Default)]
struct LocalState {
    catalog: HashMap<ProductId, ProductInfo>,
    fail_on_release: bool,
    unavailable: bool,
}

/// Gateway that talks to a ledger in the same process.
///
/// Used for tests and single-process wiring. Carries its own catalog map
/// (the catalog read model is an external collaborator) and supports
/// failure injection for compensation tests.
#[derive(Debug, Clone)]
pub struct LocalInventoryGateway<L = InMemoryStockLedger> {
    ledger: L,
    state: Arc<RwLock<LocalState>>,
}

impl<L: StockLedger> LocalInventoryGateway<L> {
    /// Creates a gateway over the given ledger.
    pub fn new(ledger: L) -> Self {
        Self {
            ledger,
            state: Arc::new(RwLock::new(LocalState::default())),
        }
    }

    /// Adds or replaces a catalog entry.
    pub fn insert_product(&self, product_id: impl Into<ProductId>, info: ProductInfo) {
        self.state
            .write()
            .unwrap()
            .catalog
            .insert(product_id.into(), info);
    }

    /// Makes every subsequent release call fail with `Unavailable`.
    pub fn set_fail_on_release(&self, fail: bool) {
        self.state.write().unwrap().fail_on_release = fail;
    }

    /// Simulates the whole inventory service being down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.write().unwrap().unavailable = unavailable;
    }

    fn check_available(&self) -> Result<(), GatewayError> {
        if self.state.read().unwrap().unavailable {
            return Err(GatewayError::Unavailable(
                "connection refused".to_string(),
            ));
        }
        Ok(())
    }
}

fn map_ledger_error(err: LedgerError) -> GatewayError {
    match err {
        LedgerError::NotFound(product_id) => GatewayError::NotFound(product_id),
        LedgerError::InsufficientStock { product_id, .. } => GatewayError::Conflict {
            product_id,
            detail: "insufficient stock".to_string(),
        },
        LedgerError::OverRelease { product_id, .. } => GatewayError::Conflict {
            product_id,
            detail: "over-release".to_string(),
        },
        LedgerError::InvalidQuantity { product_id } => GatewayError::Conflict {
            product_id,
            detail: "invalid quantity".to_string(),
        },
        LedgerError::WouldGoNegative { product_id, .. } => GatewayError::Conflict {
            product_id,
            detail: "would go negative".to_string(),
        },
        LedgerError::Database(err) => GatewayError::Unavailable(err.to_string()),
    }
}

#[async_trait]
impl<L: StockLedger> InventoryGateway for LocalInventoryGateway<L> {
    async fn fetch_product(&self, product_id: &ProductId) -> Result<ProductInfo, GatewayError> {
        self.check_available()?;

        self.state
            .read()
            .unwrap()
            .catalog
            .get(product_id)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(product_id.clone()))
    }

    async fn reserve_stock(
        &self,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<(), GatewayError> {
        self.check_available()?;

        self.ledger
            .reserve(product_id, quantity)
            .await
            .map(|_| ())
            .map_err(|err| {
                tracing::warn!(%product_id, quantity, error = %err, "reserve failed");
                map_ledger_error(err)
            })
    }

    async fn release_stock(
        &self,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<(), GatewayError> {
        if self.state.read().unwrap().fail_on_release {
            return Err(GatewayError::Unavailable("injected failure".to_string()));
        }
        self.check_available()?;

        self.ledger
            .release(product_id, quantity)
            .await
            .map(|_| ())
            .map_err(|err| {
                tracing::warn!(%product_id, quantity, error = %err, "release failed");
                map_ledger_error(err)
            })
    }
}
