//! HTTP surface for the order saga platform.
//!
//! Order endpoints over the saga orchestrator, the inventory-side
//! collaborator surface the HTTP gateway client calls, structured logging
//! (tracing) and Prometheus metrics.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, patch, post, put};
use events::{ChannelPublisher, EventEnvelope};
use inventory::{InMemoryStockLedger, StockLedger};
use metrics_exporter_prometheus::PrometheusHandle;
use saga::{InventoryGateway, LocalInventoryGateway, SagaOrchestrator};
use tokio::sync::mpsc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::orders::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<G, L>(state: Arc<AppState<G, L>>, metrics_handle: PrometheusHandle) -> Router
where
    G: InventoryGateway + 'static,
    L: StockLedger + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/orders", post(routes::orders::create::<G, L>))
        .route("/orders", get(routes::orders::list::<G, L>))
        .route("/orders/{id}", get(routes::orders::get::<G, L>))
        .route("/orders/{id}/cancel", post(routes::orders::cancel::<G, L>))
        .route(
            "/admin/orders/{id}/status",
            patch(routes::orders::advance::<G, L>),
        )
        .route("/products/{id}", get(routes::inventory::get_product::<G, L>))
        .route(
            "/products/{id}/reserve",
            post(routes::inventory::reserve::<G, L>),
        )
        .route(
            "/products/{id}/release",
            post(routes::inventory::release::<G, L>),
        )
        .route(
            "/admin/products/{id}",
            put(routes::inventory::provision::<G, L>),
        )
        .route(
            "/admin/products/{id}/stock",
            patch(routes::inventory::adjust_stock::<G, L>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Wires an application state over the given gateway and ledger.
///
/// Returns the state and the receiving end of the integration-event
/// channel; the caller owns delivery (or drops the receiver to discard).
pub fn create_state<G, L>(
    gateway: G,
    ledger: L,
) -> (
    Arc<AppState<G, L>>,
    mpsc::UnboundedReceiver<EventEnvelope>,
)
where
    G: InventoryGateway,
    L: StockLedger + Clone,
{
    use domain::InMemoryOrderRepository;

    let (publisher, events_rx) = ChannelPublisher::pair();
    let orchestrator = SagaOrchestrator::new(gateway, InMemoryOrderRepository::new(), publisher);

    let state = Arc::new(AppState {
        orchestrator,
        catalog: LocalInventoryGateway::new(ledger.clone()),
        ledger,
    });

    (state, events_rx)
}

/// Creates the default single-process wiring: in-memory ledger, local
/// gateway over that same ledger.
pub fn create_default_state() -> (
    Arc<AppState<LocalInventoryGateway, InMemoryStockLedger>>,
    mpsc::UnboundedReceiver<EventEnvelope>,
) {
    use domain::InMemoryOrderRepository;

    let ledger = InMemoryStockLedger::new();
    let catalog = LocalInventoryGateway::new(ledger.clone());
    let (publisher, events_rx) = ChannelPublisher::pair();
    let orchestrator = SagaOrchestrator::new(
        catalog.clone(),
        InMemoryOrderRepository::new(),
        publisher,
    );

    let state = Arc::new(AppState {
        orchestrator,
        catalog,
        ledger,
    });

    (state, events_rx)
}
