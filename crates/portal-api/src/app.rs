//! Application assembly: state plus router.

use std::sync::Arc;

use axum::Router;
use tracing::info;

use portal_core::config::AppConfig;
use portal_core::result::AppResult;
use portal_database::AccountRepository;
use portal_store::StoreManager;

use crate::router::build_router;
use crate::state::AppState;

/// Build the full application over an open store and account repository.
pub fn build_app(
    config: AppConfig,
    store: StoreManager,
    accounts: Arc<dyn AccountRepository>,
) -> AppResult<Router> {
    info!(
        access_ttl_seconds = config.auth.access_ttl_seconds,
        refresh_ttl_seconds = config.auth.refresh_ttl_seconds,
        revocation_ttl_seconds = config.auth.effective_revocation_ttl_seconds(),
        "Building auth application"
    );
    let state = AppState::new(config, store, accounts)?;
    Ok(build_router(state))
}
