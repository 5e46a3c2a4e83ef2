//! Order endpoints backed by the saga orchestrator.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::{OrderId, ProductId};
use domain::{InMemoryOrderRepository, Order, OrderStatus};
use events::ChannelPublisher;
use inventory::StockLedger;
use saga::{
    CreateOrderRequest, InventoryGateway, LocalInventoryGateway, OrderLine, SagaOrchestrator,
};
use serde::{Deserialize, Serialize};

use crate::auth::Caller;
use crate::error::ApiError;

/// Shared application state accessible from all handlers.
///
/// `G` is the gateway the orchestrator talks to (local or HTTP); `L` is the
/// ledger behind the inventory surface this instance serves.
pub struct AppState<G: InventoryGateway, L: StockLedger> {
    pub orchestrator: SagaOrchestrator<G, InMemoryOrderRepository, ChannelPublisher>,
    pub catalog: LocalInventoryGateway<L>,
    pub ledger: L,
}

// -- Request types --

#[derive(Deserialize)]
pub struct CreateOrderBody {
    pub shipping_address: Option<String>,
    pub notes: Option<String>,
    pub items: Vec<OrderLineBody>,
}

#[derive(Deserialize)]
pub struct OrderLineBody {
    pub product_id: String,
    pub quantity: u32,
}

#[derive(Deserialize)]
pub struct StatusBody {
    pub status: String,
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub owner_id: String,
    pub status: String,
    pub items: Vec<OrderItemResponse>,
    pub total_cents: i64,
    pub shipping_address: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

#[derive(Serialize)]
pub struct OrderItemResponse {
    pub product_id: String,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
}

impl From<&Order> for OrderResponse {
    fn from(order: &Order) -> Self {
        let items = order
            .items()
            .iter()
            .map(|item| OrderItemResponse {
                product_id: item.product_id.to_string(),
                product_name: item.product_name.clone(),
                quantity: item.quantity,
                unit_price_cents: item.unit_price.cents(),
            })
            .collect();

        OrderResponse {
            id: order.id().to_string(),
            owner_id: order.owner_id().to_string(),
            status: order.status().to_string(),
            items,
            total_cents: order.total_amount().cents(),
            shipping_address: order.shipping_address().map(String::from),
            notes: order.notes().map(String::from),
            created_at: order.created_at().to_rfc3339(),
            updated_at: order.updated_at().map(|at| at.to_rfc3339()),
        }
    }
}

// -- Handlers --

/// POST /orders: run the creation saga for the caller.
#[tracing::instrument(skip_all, fields(items = body.items.len()))]
pub async fn create<G: InventoryGateway + 'static, L: StockLedger + 'static>(
    State(state): State<Arc<AppState<G, L>>>,
    Caller(principal): Caller,
    Json(body): Json<CreateOrderBody>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    let request = CreateOrderRequest {
        shipping_address: body.shipping_address,
        notes: body.notes,
        items: body
            .items
            .into_iter()
            .map(|line| OrderLine {
                product_id: ProductId::new(line.product_id),
                quantity: line.quantity,
            })
            .collect(),
    };

    let order = state
        .orchestrator
        .create_order(principal.user_id, request)
        .await?;

    Ok((StatusCode::CREATED, Json(OrderResponse::from(&order))))
}

/// GET /orders: list the caller's own orders.
#[tracing::instrument(skip_all)]
pub async fn list<G: InventoryGateway + 'static, L: StockLedger + 'static>(
    State(state): State<Arc<AppState<G, L>>>,
    Caller(principal): Caller,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let orders = state.orchestrator.list_orders(principal).await?;
    Ok(Json(orders.iter().map(OrderResponse::from).collect()))
}

/// GET /orders/:id: load one order (owner or admin).
#[tracing::instrument(skip(state))]
pub async fn get<G: InventoryGateway + 'static, L: StockLedger + 'static>(
    State(state): State<Arc<AppState<G, L>>>,
    Caller(principal): Caller,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let order = state.orchestrator.get_order(order_id, principal).await?;
    Ok(Json(OrderResponse::from(&order)))
}

/// POST /orders/:id/cancel: run the cancellation saga.
#[tracing::instrument(skip(state))]
pub async fn cancel<G: InventoryGateway + 'static, L: StockLedger + 'static>(
    State(state): State<Arc<AppState<G, L>>>,
    Caller(principal): Caller,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let order_id = parse_order_id(&id)?;
    state.orchestrator.cancel_order(order_id, principal).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /admin/orders/:id/status: administrative status progression.
#[tracing::instrument(skip(state, body))]
pub async fn advance<G: InventoryGateway + 'static, L: StockLedger + 'static>(
    State(state): State<Arc<AppState<G, L>>>,
    Caller(principal): Caller,
    Path(id): Path<String>,
    Json(body): Json<StatusBody>,
) -> Result<StatusCode, ApiError> {
    let order_id = parse_order_id(&id)?;
    let status = OrderStatus::parse(&body.status)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown status: {}", body.status)))?;

    state
        .orchestrator
        .advance_status(order_id, status, principal)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

fn parse_order_id(id: &str) -> Result<OrderId, ApiError> {
    let uuid = uuid::Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid order ID: {e}")))?;
    Ok(OrderId::from_uuid(uuid))
}
