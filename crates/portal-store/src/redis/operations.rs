//! Redis store provider implementation.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::debug;

use portal_core::error::{AppError, ErrorKind};
use portal_core::result::AppResult;
use portal_core::traits::store::KeyValueStore;

use super::client::RedisClient;

/// Writes a hash field only when the hash is still present.
///
/// KEYS[1] = hash key
/// ARGV[1] = field
/// ARGV[2] = value
///
/// Returns 1 when written, 0 when the hash is missing.
const HSET_IF_EXISTS_SCRIPT: &str = r#"
    if redis.call('EXISTS', KEYS[1]) == 1 then
        redis.call('HSET', KEYS[1], ARGV[1], ARGV[2])
        return 1
    end
    return 0
"#;

/// Redis-backed store provider.
#[derive(Debug, Clone)]
pub struct RedisStore {
    client: RedisClient,
}

impl RedisStore {
    /// Create a new Redis store provider.
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    fn map_err(e: redis::RedisError) -> AppError {
        AppError::with_source(ErrorKind::Store, format!("Redis error: {e}"), e)
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut()?;
        let result: Option<String> = conn.get(&full_key).await.map_err(Self::map_err)?;
        Ok(result)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut()?;
        // SETEX rejects a zero expiry; an already-expired write is a removal.
        if ttl.as_secs() == 0 {
            let _: i64 = conn.del(&full_key).await.map_err(Self::map_err)?;
            return Ok(());
        }
        let _: () = conn
            .set_ex(&full_key, value, ttl.as_secs())
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<bool> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut()?;
        let removed: i64 = conn.del(&full_key).await.map_err(Self::map_err)?;
        Ok(removed > 0)
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut()?;
        let result: bool = conn.exists(&full_key).await.map_err(Self::map_err)?;
        Ok(result)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> AppResult<bool> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut()?;
        let result: bool = conn
            .expire(&full_key, ttl.as_secs() as i64)
            .await
            .map_err(Self::map_err)?;
        Ok(result)
    }

    async fn hset_all(
        &self,
        key: &str,
        fields: &[(String, String)],
        ttl: Duration,
    ) -> AppResult<()> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut()?;

        let mut pipe = redis::pipe();
        pipe.atomic().del(&full_key).ignore();
        if !fields.is_empty() && ttl.as_secs() > 0 {
            pipe.hset_multiple(&full_key, fields)
                .ignore()
                .expire(&full_key, ttl.as_secs() as i64)
                .ignore();
        }
        let _: () = pipe.query_async(&mut conn).await.map_err(Self::map_err)?;

        debug!(key = %full_key, fields = fields.len(), "Wrote hash");
        Ok(())
    }

    async fn hset_if_exists(&self, key: &str, field: &str, value: &str) -> AppResult<bool> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut()?;
        let written: i64 = redis::Script::new(HSET_IF_EXISTS_SCRIPT)
            .key(&full_key)
            .arg(field)
            .arg(value)
            .invoke_async(&mut conn)
            .await
            .map_err(Self::map_err)?;
        Ok(written == 1)
    }

    async fn hgetall(&self, key: &str) -> AppResult<HashMap<String, String>> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut()?;
        let result: HashMap<String, String> =
            conn.hgetall(&full_key).await.map_err(Self::map_err)?;
        Ok(result)
    }

    async fn sadd(&self, key: &str, member: &str) -> AppResult<bool> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut()?;
        let added: i64 = conn.sadd(&full_key, member).await.map_err(Self::map_err)?;
        Ok(added > 0)
    }

    async fn srem(&self, key: &str, member: &str) -> AppResult<bool> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut()?;
        let removed: i64 = conn.srem(&full_key, member).await.map_err(Self::map_err)?;
        Ok(removed > 0)
    }

    async fn smembers(&self, key: &str) -> AppResult<Vec<String>> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut()?;
        let members: Vec<String> = conn.smembers(&full_key).await.map_err(Self::map_err)?;
        Ok(members)
    }

    async fn health_check(&self) -> AppResult<bool> {
        let mut conn = self.client.conn_mut()?;
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(Self::map_err)?;
        Ok(pong == "PONG")
    }

    async fn close(&self) -> AppResult<()> {
        self.client.close();
        Ok(())
    }
}
