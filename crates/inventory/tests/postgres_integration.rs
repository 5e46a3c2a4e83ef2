//! PostgreSQL ledger integration tests
//!
//! These tests use a shared PostgreSQL container for efficiency.
//! Run with:
//!
//! ```bash
//! cargo test -p inventory --test postgres_integration
//! ```

use std::sync::Arc;

use common::ProductId;
use inventory::{LedgerError, PostgresStockLedger, Stock, StockLedger};
use serial_test::serial;
use sqlx::PgPool;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            let temp_pool = PgPool::connect(&connection_string).await.unwrap();

            sqlx::raw_sql(include_str!("../../../migrations/001_create_stock_table.sql"))
                .execute(&temp_pool)
                .await
                .unwrap();

            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh ledger with its own pool and a cleared table
async fn get_test_ledger() -> PostgresStockLedger {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE stock")
        .execute(&pool)
        .await
        .unwrap();

    PostgresStockLedger::new(pool)
}

#[tokio::test]
#[serial]
async fn put_and_get_stock() {
    let ledger = get_test_ledger().await;
    let product = ProductId::new("SKU-001");

    ledger.put_stock(Stock::new("SKU-001", 10)).await.unwrap();

    let stock = ledger.get_stock(&product).await.unwrap();
    assert_eq!(stock.quantity_available, 10);
    assert_eq!(stock.quantity_reserved, 0);
}

#[tokio::test]
#[serial]
async fn reserve_and_release_roundtrip() {
    let ledger = get_test_ledger().await;
    let product = ProductId::new("SKU-001");
    ledger.put_stock(Stock::new("SKU-001", 5)).await.unwrap();

    let stock = ledger.reserve(&product, 3).await.unwrap();
    assert_eq!(stock.quantity_available, 2);
    assert_eq!(stock.quantity_reserved, 3);

    let stock = ledger.release(&product, 3).await.unwrap();
    assert_eq!(stock.quantity_available, 5);
    assert_eq!(stock.quantity_reserved, 0);
}

#[tokio::test]
#[serial]
async fn insufficient_stock_is_a_conflict() {
    let ledger = get_test_ledger().await;
    let product = ProductId::new("SKU-001");
    ledger.put_stock(Stock::new("SKU-001", 2)).await.unwrap();

    let err = ledger.reserve(&product, 3).await.unwrap_err();
    assert!(matches!(
        err,
        LedgerError::InsufficientStock {
            available: 2,
            requested: 3,
            ..
        }
    ));

    // Row must be untouched
    let stock = ledger.get_stock(&product).await.unwrap();
    assert_eq!(stock.quantity_available, 2);
    assert_eq!(stock.quantity_reserved, 0);
}

#[tokio::test]
#[serial]
async fn over_release_is_rejected() {
    let ledger = get_test_ledger().await;
    let product = ProductId::new("SKU-001");
    ledger.put_stock(Stock::new("SKU-001", 5)).await.unwrap();

    ledger.reserve(&product, 1).await.unwrap();
    let err = ledger.release(&product, 2).await.unwrap_err();
    assert!(matches!(
        err,
        LedgerError::OverRelease {
            reserved: 1,
            requested: 2,
            ..
        }
    ));
}

#[tokio::test]
#[serial]
async fn missing_product_is_not_found() {
    let ledger = get_test_ledger().await;
    let product = ProductId::new("SKU-404");

    assert!(matches!(
        ledger.get_stock(&product).await,
        Err(LedgerError::NotFound(_))
    ));
    assert!(matches!(
        ledger.reserve(&product, 1).await,
        Err(LedgerError::NotFound(_))
    ));
    assert!(matches!(
        ledger.release(&product, 1).await,
        Err(LedgerError::NotFound(_))
    ));
}

#[tokio::test]
#[serial]
async fn adjust_available_guards_against_negative() {
    let ledger = get_test_ledger().await;
    let product = ProductId::new("SKU-001");
    ledger.put_stock(Stock::new("SKU-001", 5)).await.unwrap();

    let stock = ledger
        .adjust_available(&product, -2, "damaged units")
        .await
        .unwrap();
    assert_eq!(stock.quantity_available, 3);

    let err = ledger
        .adjust_available(&product, -4, "shrinkage")
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::WouldGoNegative { .. }));
}

#[tokio::test]
#[serial]
async fn adjust_above_counter_max_is_rejected() {
    let ledger = get_test_ledger().await;
    let product = ProductId::new("SKU-001");
    ledger.put_stock(Stock::new("SKU-001", 10)).await.unwrap();

    // Would fit in the BIGINT column but not in the u32 counter
    let err = ledger
        .adjust_available(&product, 5_000_000_000, "bulk restock")
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::WouldGoNegative { .. }));

    let stock = ledger.get_stock(&product).await.unwrap();
    assert_eq!(stock.quantity_available, 10);
}

#[tokio::test]
#[serial]
async fn concurrent_reserves_never_oversell() {
    let ledger = get_test_ledger().await;
    let product = ProductId::new("SKU-001");
    ledger.put_stock(Stock::new("SKU-001", 10)).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..20 {
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

    assert_eq!(successes, 10);
    let stock = ledger.get_stock(&product).await.unwrap();
    assert_eq!(stock.quantity_available, 0);
    assert_eq!(stock.quantity_reserved, 10);
}
