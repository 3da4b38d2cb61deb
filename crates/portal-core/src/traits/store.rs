//! Key-value store trait backing sessions and token revocation.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::result::AppResult;

/// A TTL-aware key-value store (Redis, or in-memory for tests and dev).
///
/// Keys passed in are logical keys; the provider applies its own global
/// prefix. Every single call is atomic on its own. Sequences of calls are not.
#[async_trait]
pub trait KeyValueStore: Send + Sync + std::fmt::Debug + 'static {
    /// Get a string value. Returns `None` if missing or expired.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Set a string value with a TTL.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()>;

    /// Delete a key of any type. Returns whether it existed.
    async fn delete(&self, key: &str) -> AppResult<bool>;

    /// Check whether a key exists.
    async fn exists(&self, key: &str) -> AppResult<bool>;

    /// Set the TTL on an existing key. Returns `false` if the key is missing.
    async fn expire(&self, key: &str, ttl: Duration) -> AppResult<bool>;

    /// Replace all fields of a hash and set its TTL in one atomic step.
    async fn hset_all(
        &self,
        key: &str,
        fields: &[(String, String)],
        ttl: Duration,
    ) -> AppResult<()>;

    /// Set one field of a hash only if the hash exists. Never touches the TTL.
    /// Returns whether the write happened.
    async fn hset_if_exists(&self, key: &str, field: &str, value: &str) -> AppResult<bool>;

    /// Read every field of a hash. An empty map means the hash is missing.
    async fn hgetall(&self, key: &str) -> AppResult<HashMap<String, String>>;

    /// Add a member to a set. Returns whether it was newly added.
    async fn sadd(&self, key: &str, member: &str) -> AppResult<bool>;

    /// Remove a member from a set. Returns whether it was present.
    async fn srem(&self, key: &str, member: &str) -> AppResult<bool>;

    /// List the members of a set (unordered).
    async fn smembers(&self, key: &str) -> AppResult<Vec<String>>;

    /// Check that the backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Release connections. Later calls may fail.
    async fn close(&self) -> AppResult<()>;
}
