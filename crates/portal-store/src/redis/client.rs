//! Redis connection management.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use redis::Client;
use redis::aio::ConnectionManager;
use tracing::info;

use portal_core::config::store::RedisStoreConfig;
use portal_core::error::{AppError, ErrorKind};
use portal_core::result::AppResult;

/// Redis client wrapper with an explicit connect/close lifecycle.
#[derive(Debug, Clone)]
pub struct RedisClient {
    /// Redis connection manager (multiplexed, reconnecting).
    conn: ConnectionManager,
    /// Key prefix for all keys.
    key_prefix: String,
    /// Set once [`RedisClient::close`] has been called.
    closed: Arc<AtomicBool>,
}

impl RedisClient {
    /// Connect to Redis using the given configuration.
    pub async fn connect(config: &RedisStoreConfig, key_prefix: &str) -> AppResult<Self> {
        info!(url = %mask_redis_url(&config.url), "Connecting to Redis");

        let client = Client::open(config.url.as_str()).map_err(|e| {
            AppError::with_source(ErrorKind::Store, "Failed to create Redis client", e)
        })?;

        let timeout = Duration::from_secs(config.connect_timeout_seconds);
        let conn = tokio::time::timeout(timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| {
                AppError::service_unavailable(format!(
                    "Timed out connecting to Redis after {}s",
                    config.connect_timeout_seconds
                ))
            })?
            .map_err(|e| {
                AppError::with_source(ErrorKind::Store, "Failed to connect to Redis", e)
            })?;

        info!("Successfully connected to Redis");
        Ok(Self {
            conn,
            key_prefix: key_prefix.to_string(),
            closed: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Get a clone of the connection manager, failing once closed.
    pub fn conn_mut(&self) -> AppResult<ConnectionManager> {
        if self.closed.load(Ordering::Acquire) {
            return Err(AppError::service_unavailable("Redis client is closed"));
        }
        Ok(self.conn.clone())
    }

    /// Build a full key with the configured prefix.
    pub fn prefixed_key(&self, key: &str) -> String {
        format!("{}{key}", self.key_prefix)
    }

    /// Mark the client closed. The underlying connection is dropped with the
    /// last clone of the manager.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            info!("Redis client closed");
        }
    }
}

/// Mask the password in a Redis URL for safe logging.
pub fn mask_redis_url(url: &str) -> String {
    if let Some(at_pos) = url.find('@') {
        if let Some(colon_pos) = url[..at_pos].rfind(':') {
            let scheme_end = url.find("://").map(|p| p + 3).unwrap_or(0);
            if colon_pos > scheme_end {
                return format!("{}:****@{}", &url[..colon_pos], &url[at_pos + 1..]);
            }
        }
    }
    url.to_string()
}
