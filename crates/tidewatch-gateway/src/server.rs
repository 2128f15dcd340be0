//! Gateway server state and startup.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};

use tidewatch_core::config::GatewayConfig;
use tidewatch_core::error::{Result, TidewatchError};
use tidewatch_core::traits::SubscriptionStore;
use tidewatch_engine::CheckRunner;

use crate::routes;

/// Shared state handed to every route handler.
pub struct AppState {
    pub store: Arc<dyn SubscriptionStore>,
    pub runner: Arc<CheckRunner>,
    pub config: GatewayConfig,
    pub start_time: std::time::Instant,
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(routes::health_check))
        .route("/commands", post(routes::handle_command))
        .with_state(state)
}

/// Bind and serve until the process exits.
pub async fn serve(state: Arc<AppState>) -> Result<()> {
    let addr = format!("{}:{}", state.config.host, state.config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| TidewatchError::Gateway(format!("bind {addr} failed: {e}")))?;

    tracing::info!(%addr, "gateway listening");
    axum::serve(listener, build_router(state))
        .await
        .map_err(|e| TidewatchError::Gateway(e.to_string()))
}
