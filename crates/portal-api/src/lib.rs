//! # portal-api
//!
//! HTTP surface of the portal auth service, built on Axum.
//!
//! Every endpoint lives under `/auth` except the `/health` probe. Failures
//! leave handlers as [`ApiError`] and are turned into the uniform error
//! envelope by [`middleware::envelope`].

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use error::ApiError;
pub use state::AppState;
