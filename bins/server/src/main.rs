//! Contabil API Server
//!
//! Main entry point for the Contabil ledger service.

mod chart;

use contabil_api::{AppState, create_router};
use contabil_core::ledger::{InMemoryEntryStore, LedgerBook};
use contabil_shared::AppConfig;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "contabil=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load()?;

    // Build the book
    let registry = chart::load(config.ledger.chart_path.as_deref())?;
    let book = LedgerBook::from_config(registry, InMemoryEntryStore::new(), &config.ledger);
    info!(
        operation_timeout_ms = config.ledger.operation_timeout_ms,
        reject_future_dates = config.ledger.reject_future_dates,
        "Ledger book ready"
    );

    let app = create_router(AppState::new(book));

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
