//! Order saga: multi-item reservation with explicit compensation.
//!
//! The orchestrator drives the reserve-all-then-commit flow: every line
//! item is fetched and reserved through the inventory gateway before any
//! order row is written; a failure part-way triggers release of everything
//! reserved so far in this run. There is no distributed transaction and no
//! saga-level lock; concurrent requests race at the ledger row and the
//! loser compensates only its own reservations.

pub mod error;
pub mod gateway;
pub mod orchestrator;

pub use error::SagaError;
pub use gateway::{
    GatewayError, HttpInventoryGateway, InventoryGateway, LocalInventoryGateway, ProductInfo,
};
pub use orchestrator::{CreateOrderRequest, OrderLine, SagaOrchestrator};
