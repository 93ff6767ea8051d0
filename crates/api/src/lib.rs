//! HTTP API layer with Axum routes and the socket hub.
//!
//! This crate provides:
//! - REST API routes
//! - The websocket room hub backing the refresh channel
//! - Response types

pub mod routes;
pub mod ws;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use cuzdan_shared::RateService;
use ws::SocketHub;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Exchange-rate source client.
    pub rates: Arc<RateService>,
    /// Socket room hub for refresh signals.
    pub hub: Arc<SocketHub>,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
