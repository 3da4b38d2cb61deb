//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use portal_auth::AuthOrchestrator;
use portal_core::config::AppConfig;
use portal_core::result::AppResult;
use portal_database::AccountRepository;
use portal_store::StoreManager;

/// Shared dependencies, passed to every handler via `State<AppState>`.
///
/// Every field is cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Auth policy over sessions, tokens and accounts.
    pub orchestrator: Arc<AuthOrchestrator>,
    /// Key-value store, kept for health probes.
    pub store: StoreManager,
    /// Account repository, kept for health probes.
    pub accounts: Arc<dyn AccountRepository>,
}

impl AppState {
    /// Wire the orchestrator over an open store and account repository.
    pub fn new(
        config: AppConfig,
        store: StoreManager,
        accounts: Arc<dyn AccountRepository>,
    ) -> AppResult<Self> {
        let orchestrator =
            AuthOrchestrator::from_config(&config, store.clone(), Arc::clone(&accounts))?;
        Ok(Self {
            config: Arc::new(config),
            orchestrator: Arc::new(orchestrator),
            store,
            accounts,
        })
    }
}
