//! Account repository trait and its backends.

pub mod account;
pub mod memory;
pub mod postgres;

use std::sync::Arc;

use tracing::info;

use portal_core::config::database::DatabaseConfig;
use portal_core::error::AppError;
use portal_core::result::AppResult;

use crate::connection::DatabasePool;
use crate::migration::run_migrations;

pub use account::AccountRepository;
pub use memory::MemoryAccountRepository;
pub use postgres::PgAccountRepository;

/// The configured account repository plus the pool behind it, if any.
#[derive(Debug, Clone)]
pub struct AccountBackend {
    repository: Arc<dyn AccountRepository>,
    pool: Option<DatabasePool>,
}

impl AccountBackend {
    /// Build the repository named in configuration, connecting and
    /// migrating PostgreSQL when selected.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        match config.provider.as_str() {
            "postgres" => {
                let pool = DatabasePool::connect(config).await?;
                if config.run_migrations {
                    run_migrations(pool.pool()).await?;
                }
                Ok(Self {
                    repository: Arc::new(PgAccountRepository::new(pool.pool().clone())),
                    pool: Some(pool),
                })
            }
            "memory" => {
                info!("Using in-memory account repository");
                Ok(Self::in_memory())
            }
            other => Err(AppError::configuration(format!(
                "Unknown database provider: '{other}'. Supported: memory, postgres"
            ))),
        }
    }

    /// An empty in-memory backend.
    pub fn in_memory() -> Self {
        Self {
            repository: Arc::new(MemoryAccountRepository::new()),
            pool: None,
        }
    }

    /// Shared handle to the repository.
    pub fn repository(&self) -> Arc<dyn AccountRepository> {
        Arc::clone(&self.repository)
    }

    /// Close the connection pool, if one was opened.
    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}
