//! Health probe.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use tracing::warn;

use portal_core::traits::KeyValueStore;

use crate::dto::response::HealthResponse;
use crate::state::AppState;

/// GET /health
///
/// 200 when both the key-value store and the account repository answer,
/// 503 otherwise.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let store_ok = match state.store.health_check().await {
        Ok(ok) => ok,
        Err(e) => {
            warn!(error = %e, "Store health check failed");
            false
        }
    };
    let database_ok = match state.accounts.health_check().await {
        Ok(ok) => ok,
        Err(e) => {
            warn!(error = %e, "Account repository health check failed");
            false
        }
    };

    let label = |ok: bool| if ok { "up" } else { "down" }.to_string();
    let healthy = store_ok && database_ok;
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthResponse {
            status: if healthy { "ok" } else { "degraded" }.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            store: label(store_ok),
            database: label(database_ok),
        }),
    )
}
