//! Inventory surface endpoints.
//!
//! This is the counterparty the HTTP gateway client calls: product lookup
//! plus raw reserve/release on the ledger, and administrative stock
//! provisioning and correction.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::ProductId;
use domain::Money;
use inventory::{Stock, StockLedger};
use saga::{InventoryGateway, ProductInfo};
use serde::{Deserialize, Serialize};

use crate::auth::Caller;
use crate::error::ApiError;
use crate::routes::orders::AppState;

// -- Request types --

#[derive(Deserialize)]
pub struct QuantityBody {
    pub quantity: u32,
}

#[derive(Deserialize)]
pub struct AdjustBody {
    pub delta: i64,
    pub reason: String,
}

#[derive(Deserialize)]
pub struct ProvisionBody {
    pub name: String,
    pub unit_price_cents: i64,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub initial_available: u32,
}

fn default_active() -> bool {
    true
}

// -- Response types --

#[derive(Serialize)]
pub struct ProductResponse {
    pub name: String,
    pub unit_price_cents: i64,
    pub is_active: bool,
    pub quantity_available: u32,
    pub quantity_reserved: u32,
}

#[derive(Serialize)]
pub struct StockResponse {
    pub product_id: String,
    pub quantity_available: u32,
    pub quantity_reserved: u32,
}

impl From<Stock> for StockResponse {
    fn from(stock: Stock) -> Self {
        StockResponse {
            product_id: stock.product_id.to_string(),
            quantity_available: stock.quantity_available,
            quantity_reserved: stock.quantity_reserved,
        }
    }
}

// -- Handlers --

/// GET /products/:id: product details plus current stock counters.
#[tracing::instrument(skip(state))]
pub async fn get_product<G: InventoryGateway + 'static, L: StockLedger + 'static>(
    State(state): State<Arc<AppState<G, L>>>,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product_id = ProductId::new(id);
    let info = state.catalog.fetch_product(&product_id).await?;

    // Catalog entry without a stock row reads as zero stock
    let (available, reserved) = match state.ledger.get_stock(&product_id).await {
        Ok(stock) => (stock.quantity_available, stock.quantity_reserved),
        Err(inventory::LedgerError::NotFound(_)) => (0, 0),
        Err(err) => return Err(err.into()),
    };

    Ok(Json(ProductResponse {
        name: info.name,
        unit_price_cents: info.unit_price.cents(),
        is_active: info.is_active,
        quantity_available: available,
        quantity_reserved: reserved,
    }))
}

/// POST /products/:id/reserve: move units from available to reserved.
#[tracing::instrument(skip(state, body))]
pub async fn reserve<G: InventoryGateway + 'static, L: StockLedger + 'static>(
    State(state): State<Arc<AppState<G, L>>>,
    Path(id): Path<String>,
    Json(body): Json<QuantityBody>,
) -> Result<Json<StockResponse>, ApiError> {
    let stock = state
        .ledger
        .reserve(&ProductId::new(id), body.quantity)
        .await?;
    Ok(Json(stock.into()))
}

/// POST /products/:id/release: move units from reserved back to available.
#[tracing::instrument(skip(state, body))]
pub async fn release<G: InventoryGateway + 'static, L: StockLedger + 'static>(
    State(state): State<Arc<AppState<G, L>>>,
    Path(id): Path<String>,
    Json(body): Json<QuantityBody>,
) -> Result<Json<StockResponse>, ApiError> {
    let stock = state
        .ledger
        .release(&ProductId::new(id), body.quantity)
        .await?;
    Ok(Json(stock.into()))
}

/// PATCH /admin/products/:id/stock: administrative correction of the
/// available counter.
#[tracing::instrument(skip(state, body))]
pub async fn adjust_stock<G: InventoryGateway + 'static, L: StockLedger + 'static>(
    State(state): State<Arc<AppState<G, L>>>,
    Caller(principal): Caller,
    Path(id): Path<String>,
    Json(body): Json<AdjustBody>,
) -> Result<Json<StockResponse>, ApiError> {
    if !principal.is_admin() {
        return Err(ApiError::Saga(saga::SagaError::AccessDenied));
    }

    let stock = state
        .ledger
        .adjust_available(&ProductId::new(id), body.delta, &body.reason)
        .await?;
    Ok(Json(stock.into()))
}

/// PUT /admin/products/:id: provision a catalog entry and its stock row.
#[tracing::instrument(skip(state, body))]
pub async fn provision<G: InventoryGateway + 'static, L: StockLedger + 'static>(
    State(state): State<Arc<AppState<G, L>>>,
    Caller(principal): Caller,
    Path(id): Path<String>,
    Json(body): Json<ProvisionBody>,
) -> Result<StatusCode, ApiError> {
    if !principal.is_admin() {
        return Err(ApiError::Saga(saga::SagaError::AccessDenied));
    }

    let product_id = ProductId::new(id);
    state.catalog.insert_product(
        product_id.clone(),
        ProductInfo {
            name: body.name,
            unit_price: Money::from_cents(body.unit_price_cents),
            is_active: body.is_active,
        },
    );

    // Re-provisioning resets the available counter but must not clobber
    // reservations held by in-flight orders.
    let reserved = match state.ledger.get_stock(&product_id).await {
        Ok(stock) => stock.quantity_reserved,
        Err(inventory::LedgerError::NotFound(_)) => 0,
        Err(err) => return Err(err.into()),
    };

    let mut stock = Stock::new(product_id, body.initial_available);
    stock.quantity_reserved = reserved;
    state.ledger.put_stock(stock).await?;

    Ok(StatusCode::NO_CONTENT)
}
