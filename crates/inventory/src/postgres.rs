//! PostgreSQL-backed stock ledger.

use async_trait::async_trait;
use common::ProductId;
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::error::LedgerError;
use crate::ledger::{StockLedger, validate_quantity};
use crate::stock::Stock;

/// Stock ledger persisted in PostgreSQL.
///
/// Reserve and release are single conditional `UPDATE … RETURNING`
/// statements; the row lock taken by the update serializes concurrent
/// callers, and the `WHERE` guard makes the counter check and the mutation
/// one atomic step.
#[derive(Clone)]
pub struct PostgresStockLedger {
    pool: PgPool,
}

impl PostgresStockLedger {
    /// Creates a new PostgreSQL stock ledger.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn counter(row: &PgRow, column: &str) -> Result<u32, LedgerError> {
        let value = row.try_get::<i64, _>(column)?;
        u32::try_from(value).map_err(|_| {
            LedgerError::Database(sqlx::Error::Decode(
                format!("stock column {column} out of u32 range: {value}").into(),
            ))
        })
    }

    fn row_to_stock(row: PgRow) -> Result<Stock, LedgerError> {
        Ok(Stock {
            product_id: ProductId::new(row.try_get::<String, _>("product_id")?),
            quantity_available: Self::counter(&row, "quantity_available")?,
            quantity_reserved: Self::counter(&row, "quantity_reserved")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    async fn fetch_row(&self, product_id: &ProductId) -> Result<Option<Stock>, LedgerError> {
        let row = sqlx::query(
            r#"
            SELECT product_id, quantity_available, quantity_reserved, updated_at
            FROM stock
            WHERE product_id = $1
            "#,
        )
        .bind(product_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_stock).transpose()
    }
}

#[async_trait]
impl StockLedger for PostgresStockLedger {
    async fn get_stock(&self, product_id: &ProductId) -> Result<Stock, LedgerError> {
        self.fetch_row(product_id)
            .await?
            .ok_or_else(|| LedgerError::NotFound(product_id.clone()))
    }

    async fn reserve(&self, product_id: &ProductId, quantity: u32) -> Result<Stock, LedgerError> {
        validate_quantity(product_id, quantity)?;

        let updated = sqlx::query(
            r#"
            UPDATE stock
            SET quantity_available = quantity_available - $2,
                quantity_reserved = quantity_reserved + $2,
                updated_at = now()
            WHERE product_id = $1 AND quantity_available >= $2
            RETURNING product_id, quantity_available, quantity_reserved, updated_at
            "#,
        )
        .bind(product_id.as_str())
        .bind(quantity as i64)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(row) => {
                metrics::counter!("ledger_reservations_total").increment(1);
                tracing::debug!(%product_id, quantity, "stock reserved");
                Self::row_to_stock(row)
            }
            // The guard failed: either the row is missing or the counter
            // was too low. A follow-up read tells them apart.
            None => match self.fetch_row(product_id).await? {
                Some(stock) => {
                    metrics::counter!("ledger_reserve_conflicts_total").increment(1);
                    Err(LedgerError::InsufficientStock {
                        product_id: product_id.clone(),
                        available: stock.quantity_available,
                        requested: quantity,
                    })
                }
                None => Err(LedgerError::NotFound(product_id.clone())),
            },
        }
    }

    async fn release(&self, product_id: &ProductId, quantity: u32) -> Result<Stock, LedgerError> {
        validate_quantity(product_id, quantity)?;

        let updated = sqlx::query(
            r#"
            UPDATE stock
            SET quantity_reserved = quantity_reserved - $2,
                quantity_available = quantity_available + $2,
                updated_at = now()
            WHERE product_id = $1 AND quantity_reserved >= $2
            RETURNING product_id, quantity_available, quantity_reserved, updated_at
            "#,
        )
        .bind(product_id.as_str())
        .bind(quantity as i64)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(row) => {
                metrics::counter!("ledger_releases_total").increment(1);
                tracing::debug!(%product_id, quantity, "stock released");
                Self::row_to_stock(row)
            }
            None => match self.fetch_row(product_id).await? {
                Some(stock) => Err(LedgerError::OverRelease {
                    product_id: product_id.clone(),
                    reserved: stock.quantity_reserved,
                    requested: quantity,
                }),
                None => Err(LedgerError::NotFound(product_id.clone())),
            },
        }
    }

    async fn adjust_available(
        &self,
        product_id: &ProductId,
        delta: i64,
        reason: &str,
    ) -> Result<Stock, LedgerError> {
        // The counter must stay in u32 range; the BIGINT column would
        // otherwise accept values the ledger cannot represent.
        let updated = sqlx::query(
            r#"
            UPDATE stock
            SET quantity_available = quantity_available + $2,
                updated_at = now()
            WHERE product_id = $1
              AND quantity_available + $2 BETWEEN 0 AND 4294967295
            RETURNING product_id, quantity_available, quantity_reserved, updated_at
            "#,
        )
        .bind(product_id.as_str())
        .bind(delta)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(row) => {
                let stock = Self::row_to_stock(row)?;
                tracing::info!(%product_id, delta, reason, available = stock.quantity_available, "stock adjusted");
                Ok(stock)
            }
            None => match self.fetch_row(product_id).await? {
                Some(stock) => Err(LedgerError::WouldGoNegative {
                    product_id: product_id.clone(),
                    available: stock.quantity_available,
                    delta,
                }),
                None => Err(LedgerError::NotFound(product_id.clone())),
            },
        }
    }

    async fn put_stock(&self, stock: Stock) -> Result<(), LedgerError> {
        sqlx::query(
            r#"
            INSERT INTO stock (product_id, quantity_available, quantity_reserved, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (product_id) DO UPDATE
            SET quantity_available = EXCLUDED.quantity_available,
                quantity_reserved = EXCLUDED.quantity_reserved,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(stock.product_id.as_str())
        .bind(stock.quantity_available as i64)
        .bind(stock.quantity_reserved as i64)
        .bind(stock.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
