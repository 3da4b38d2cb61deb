//! Route definitions for the portal auth HTTP API.
//!
//! Auth routes are mounted under `/auth`; the health probe sits at the root.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, post},
};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.server.body_limit_bytes;
    let cors = middleware::cors::build_cors_layer(&state.config.server.cors);

    Router::new()
        .nest("/auth", auth_routes())
        .route("/health", get(handlers::health::health))
        .layer(axum_middleware::from_fn(
            middleware::envelope::error_envelope,
        ))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(axum_middleware::from_fn(
            middleware::logging::request_logging,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Public and authenticated auth endpoints.
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/refresh", post(handlers::auth::refresh))
        .route("/profile", get(handlers::auth::profile))
        .route("/verify", post(handlers::auth::verify))
        .route("/logout", post(handlers::auth::logout))
        .route("/logout-all", post(handlers::auth::logout_all))
        .route("/sessions", get(handlers::auth::list_sessions))
        .route(
            "/sessions/{session_id}",
            delete(handlers::auth::terminate_session),
        )
}
