//! HTTP route handlers for the gateway.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};

use crate::commands::{self, CommandRequest};
use crate::server::AppState;
use crate::verify::verify_signature;

const SIGNATURE_HEADER: &str = "x-tidewatch-signature";

/// Health check endpoint.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "tidewatch-gateway",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": state.start_time.elapsed().as_secs(),
    }))
}

/// Command endpoint: verifies the body signature, then dispatches.
pub async fn handle_command(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, Json<serde_json::Value>) {
    let signature = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());
    if let Err(e) = verify_signature(state.config.secret.as_deref(), signature, &body) {
        tracing::warn!(error = %e, "rejected unsigned command request");
        return (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "ok": false, "message": "unauthorized" })),
        );
    }

    let request: CommandRequest = match serde_json::from_str(&body) {
        Ok(request) => request,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "ok": false, "message": format!("bad request: {e}") })),
            );
        }
    };

    let response = commands::dispatch(&state, request).await;
    let status = if response.ok { StatusCode::OK } else { StatusCode::UNPROCESSABLE_ENTITY };
    (
        status,
        Json(serde_json::json!({ "ok": response.ok, "message": response.message })),
    )
}
