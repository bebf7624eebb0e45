use crate::startup::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

/// Liveness probe. Reports whether the provider key and log store are set
/// without contacting either.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "search-service",
        "version": env!("CARGO_PKG_VERSION"),
        "provider_configured": state.relay.has_provider(),
        "logging_enabled": state.relay.logging_enabled(),
    }))
}
