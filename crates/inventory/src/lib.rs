//! Inventory ledger for the order platform.
//!
//! The ledger owns per-product available/reserved counters. A reservation
//! moves units from available to reserved without changing total ownership;
//! only an explicit administrative adjustment changes the total. Every
//! operation is a single atomic read-modify-write against one product row,
//! so concurrent reserve/release calls can never interleave into a negative
//! counter.

pub mod error;
pub mod ledger;
pub mod memory;
pub mod postgres;
pub mod stock;

pub use error::LedgerError;
pub use ledger::StockLedger;
pub use memory::InMemoryStockLedger;
pub use postgres::PostgresStockLedger;
pub use stock::Stock;

/// Convenience type alias for ledger results.
pub type Result<T> = std::result::Result<T, LedgerError>;
