//! API server entry point.

use api::config::Config;
use inventory::{InMemoryStockLedger, PostgresStockLedger, StockLedger};
use metrics_exporter_prometheus::PrometheusHandle;
use saga::{HttpInventoryGateway, LocalInventoryGateway};
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

async fn run<L>(config: Config, ledger: L, metrics_handle: PrometheusHandle)
where
    L: StockLedger + Clone + 'static,
{
    match config.catalog_url.clone() {
        Some(url) => {
            let gateway =
                HttpInventoryGateway::new(&url).expect("failed to build catalog HTTP client");
            tracing::info!(catalog_url = %url, "using remote inventory gateway");
            serve(config, gateway, ledger, metrics_handle).await;
        }
        None => {
            let gateway = LocalInventoryGateway::new(ledger.clone());
            serve(config, gateway, ledger, metrics_handle).await;
        }
    }
}

async fn serve<G, L>(config: Config, gateway: G, ledger: L, metrics_handle: PrometheusHandle)
where
    G: saga::InventoryGateway + 'static,
    L: StockLedger + Clone + 'static,
{
    let (state, mut events_rx) = api::create_state(gateway, ledger);

    // Delivery to the downstream notifier is out of scope; log each event
    tokio::spawn(async move {
        while let Some(envelope) = events_rx.recv().await {
            tracing::info!(
                event_id = %envelope.event_id,
                event_type = envelope.event.event_type(),
                "integration event",
            );
        }
    });

    let app = api::create_app(state, metrics_handle);

    let addr = config.addr();
    tracing::info!(%addr, "starting API server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("server shut down gracefully");
}

#[tokio::main]
async fn main() {
    let config = Config::from_env();

    // 1. Initialize tracing
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. Install Prometheus metrics recorder
    let prometheus_builder = metrics_exporter_prometheus::PrometheusBuilder::new();
    let metrics_handle = prometheus_builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // 3. Pick the ledger backend and serve
    match config.database_url.clone() {
        Some(url) => {
            let pool = sqlx::PgPool::connect(&url)
                .await
                .expect("failed to connect to database");
            let ledger = PostgresStockLedger::new(pool);
            ledger.run_migrations().await.expect("migrations failed");
            tracing::info!("using PostgreSQL stock ledger");
            run(config, ledger, metrics_handle).await;
        }
        None => {
            tracing::info!("using in-memory stock ledger");
            run(config, InMemoryStockLedger::new(), metrics_handle).await;
        }
    }
}
