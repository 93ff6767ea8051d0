//! Cuzdan API Server
//!
//! Main entry point for the Cuzdan backend service.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cuzdan_api::{AppState, create_router, ws::SocketHub};
use cuzdan_db::connect;
use cuzdan_shared::{AppConfig, RateService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cuzdan=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Connect to database
    let db = connect(&config.database.url).await?;
    info!("Connected to database");

    // Create exchange-rate client
    let rates = RateService::new(config.rates.clone())?;
    info!(url = %config.rates.url, "Rate source configured");

    // Create application state
    let state = AppState {
        db: Arc::new(db),
        rates: Arc::new(rates),
        hub: Arc::new(SocketHub::new()),
    };

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
