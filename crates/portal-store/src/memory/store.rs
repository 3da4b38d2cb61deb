//! In-memory store implementation using dashmap.
//!
//! Expiry is tracked per entry against the tokio clock, so tests running
//! with a paused runtime can move time forward with `tokio::time::advance`.
//! Expired entries are dropped lazily when touched.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry as MapEntry;
use tokio::time::Instant;
use tracing::debug;

use portal_core::error::AppError;
use portal_core::result::AppResult;
use portal_core::traits::store::KeyValueStore;

#[derive(Debug, Clone)]
enum Value {
    Str(String),
    Hash(HashMap<String, String>),
    Set(HashSet<String>),
}

impl Value {
    fn type_name(&self) -> &'static str {
        match self {
            Value::Str(_) => "string",
            Value::Hash(_) => "hash",
            Value::Set(_) => "set",
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

fn wrong_type(key: &str, expected: &str, found: &Value) -> AppError {
    AppError::store(format!(
        "WRONGTYPE key '{key}' holds a {} value, expected {expected}",
        found.type_name()
    ))
}

/// In-memory store provider.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<DashMap<String, Entry>>,
    closed: Arc<AtomicBool>,
}

impl MemoryStore {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unexpired) keys.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries.iter().filter(|e| !e.is_expired(now)).count()
    }

    /// Whether the store holds no live keys.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remaining TTL of a key, if it exists and has one.
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        self.entries
            .get(key)
            .filter(|e| !e.is_expired(now))
            .and_then(|e| e.expires_at)
            .map(|at| at.saturating_duration_since(now))
    }

    fn ensure_open(&self) -> AppResult<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(AppError::service_unavailable("In-memory store is closed"));
        }
        Ok(())
    }

    /// Fetch a live entry, evicting it first if it has expired.
    fn live(&self, key: &str) -> Option<Entry> {
        let now = Instant::now();
        self.entries.remove_if(key, |_, e| e.is_expired(now));
        self.entries.get(key).map(|e| e.clone())
    }

    /// Run `f` against the live entry for `key` under the shard lock.
    fn with_live_entry<T>(
        &self,
        key: &str,
        f: impl FnOnce(MapEntry<'_, String, Entry>) -> AppResult<T>,
    ) -> AppResult<T> {
        let now = Instant::now();
        let entry = match self.entries.entry(key.to_string()) {
            MapEntry::Occupied(occupied) if occupied.get().is_expired(now) => {
                let vacant_key = occupied.key().clone();
                occupied.remove();
                self.entries.entry(vacant_key)
            }
            other => other,
        };
        f(entry)
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.ensure_open()?;
        match self.live(key) {
            Some(Entry {
                value: Value::Str(s),
                ..
            }) => Ok(Some(s)),
            Some(other) => Err(wrong_type(key, "string", &other.value)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        self.ensure_open()?;
        if ttl.is_zero() {
            self.entries.remove(key);
            return Ok(());
        }
        self.entries.insert(
            key.to_string(),
            Entry {
                value: Value::Str(value.to_string()),
                expires_at: Some(Instant::now() + ttl),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<bool> {
        self.ensure_open()?;
        let now = Instant::now();
        Ok(self
            .entries
            .remove(key)
            .is_some_and(|(_, e)| !e.is_expired(now)))
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        self.ensure_open()?;
        Ok(self.live(key).is_some())
    }

    async fn expire(&self, key: &str, ttl: Duration) -> AppResult<bool> {
        self.ensure_open()?;
        self.with_live_entry(key, |entry| match entry {
            MapEntry::Occupied(mut occupied) => {
                if ttl.is_zero() {
                    occupied.remove();
                } else {
                    occupied.get_mut().expires_at = Some(Instant::now() + ttl);
                }
                Ok(true)
            }
            MapEntry::Vacant(_) => Ok(false),
        })
    }

    async fn hset_all(
        &self,
        key: &str,
        fields: &[(String, String)],
        ttl: Duration,
    ) -> AppResult<()> {
        self.ensure_open()?;
        if fields.is_empty() || ttl.is_zero() {
            self.entries.remove(key);
            return Ok(());
        }
        let hash: HashMap<String, String> = fields.iter().cloned().collect();
        self.entries.insert(
            key.to_string(),
            Entry {
                value: Value::Hash(hash),
                expires_at: Some(Instant::now() + ttl),
            },
        );
        debug!(key, fields = fields.len(), "Wrote hash");
        Ok(())
    }

    async fn hset_if_exists(&self, key: &str, field: &str, value: &str) -> AppResult<bool> {
        self.ensure_open()?;
        self.with_live_entry(key, |entry| match entry {
            MapEntry::Occupied(mut occupied) => match &mut occupied.get_mut().value {
                Value::Hash(hash) => {
                    hash.insert(field.to_string(), value.to_string());
                    Ok(true)
                }
                other => Err(wrong_type(key, "hash", other)),
            },
            MapEntry::Vacant(_) => Ok(false),
        })
    }

    async fn hgetall(&self, key: &str) -> AppResult<HashMap<String, String>> {
        self.ensure_open()?;
        match self.live(key) {
            Some(Entry {
                value: Value::Hash(hash),
                ..
            }) => Ok(hash),
            Some(other) => Err(wrong_type(key, "hash", &other.value)),
            None => Ok(HashMap::new()),
        }
    }

    async fn sadd(&self, key: &str, member: &str) -> AppResult<bool> {
        self.ensure_open()?;
        self.with_live_entry(key, |entry| match entry {
            MapEntry::Occupied(mut occupied) => match &mut occupied.get_mut().value {
                Value::Set(set) => Ok(set.insert(member.to_string())),
                other => Err(wrong_type(key, "set", other)),
            },
            MapEntry::Vacant(vacant) => {
                let mut set = HashSet::new();
                set.insert(member.to_string());
                vacant.insert(Entry {
                    value: Value::Set(set),
                    expires_at: None,
                });
                Ok(true)
            }
        })
    }

    async fn srem(&self, key: &str, member: &str) -> AppResult<bool> {
        self.ensure_open()?;
        self.with_live_entry(key, |entry| match entry {
            MapEntry::Occupied(mut occupied) => {
                let removed = match &mut occupied.get_mut().value {
                    Value::Set(set) => set.remove(member),
                    other => return Err(wrong_type(key, "set", other)),
                };
                // Redis drops a set once its last member is removed.
                if matches!(&occupied.get().value, Value::Set(set) if set.is_empty()) {
                    occupied.remove();
                }
                Ok(removed)
            }
            MapEntry::Vacant(_) => Ok(false),
        })
    }

    async fn smembers(&self, key: &str) -> AppResult<Vec<String>> {
        self.ensure_open()?;
        match self.live(key) {
            Some(Entry {
                value: Value::Set(set),
                ..
            }) => Ok(set.into_iter().collect()),
            Some(other) => Err(wrong_type(key, "set", &other.value)),
            None => Ok(Vec::new()),
        }
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(!self.closed.load(Ordering::Acquire))
    }

    async fn close(&self) -> AppResult<()> {
        self.closed.store(true, Ordering::Release);
        self.entries.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_set_get() {
        let store = MemoryStore::new();
        store
            .set("key1", "value1", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(store.get("key1").await.unwrap(), Some("value1".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_string_expires() {
        let store = MemoryStore::new();
        store
            .set("short", "v", Duration::from_secs(10))
            .await
            .unwrap();
        tokio::time::advance(Duration::from_secs(9)).await;
        assert!(store.exists("short").await.unwrap());
        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(!store.exists("short").await.unwrap());
        assert_eq!(store.get("short").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_zero_ttl_writes_nothing() {
        let store = MemoryStore::new();
        store.set("gone", "v", Duration::ZERO).await.unwrap();
        assert!(!store.exists("gone").await.unwrap());
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_hash_lifecycle() {
        let store = MemoryStore::new();
        store
            .hset_all(
                "h",
                &fields(&[("a", "1"), ("b", "2")]),
                Duration::from_secs(100),
            )
            .await
            .unwrap();

        assert!(store.hset_if_exists("h", "a", "10").await.unwrap());
        let hash = store.hgetall("h").await.unwrap();
        assert_eq!(hash.get("a").map(String::as_str), Some("10"));
        assert_eq!(hash.get("b").map(String::as_str), Some("2"));

        // Updating a field leaves the TTL alone.
        tokio::time::advance(Duration::from_secs(60)).await;
        store.hset_if_exists("h", "b", "20").await.unwrap();
        assert_eq!(store.ttl("h"), Some(Duration::from_secs(40)));

        tokio::time::advance(Duration::from_secs(40)).await;
        assert!(store.hgetall("h").await.unwrap().is_empty());
        assert!(!store.hset_if_exists("h", "a", "1").await.unwrap());
        assert!(!store.exists("h").await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expire_shortens_ttl() {
        let store = MemoryStore::new();
        store
            .hset_all("h", &fields(&[("a", "1")]), Duration::from_secs(1000))
            .await
            .unwrap();
        assert!(store.expire("h", Duration::from_secs(5)).await.unwrap());
        tokio::time::advance(Duration::from_secs(5)).await;
        assert!(!store.exists("h").await.unwrap());
        assert!(!store.expire("h", Duration::from_secs(5)).await.unwrap());
    }

    #[tokio::test]
    async fn test_set_membership() {
        let store = MemoryStore::new();
        assert!(store.sadd("s", "one").await.unwrap());
        assert!(!store.sadd("s", "one").await.unwrap());
        assert!(store.sadd("s", "two").await.unwrap());

        let mut members = store.smembers("s").await.unwrap();
        members.sort();
        assert_eq!(members, vec!["one".to_string(), "two".to_string()]);

        assert!(store.srem("s", "one").await.unwrap());
        assert!(!store.srem("s", "one").await.unwrap());
        assert!(store.srem("s", "two").await.unwrap());
        assert!(!store.exists("s").await.unwrap());
    }

    #[tokio::test]
    async fn test_wrong_type_is_error() {
        let store = MemoryStore::new();
        store
            .set("str", "v", Duration::from_secs(60))
            .await
            .unwrap();
        assert!(store.sadd("str", "m").await.is_err());
        assert!(store.hgetall("str").await.is_err());
    }

    #[tokio::test]
    async fn test_delete_reports_presence() {
        let store = MemoryStore::new();
        store.sadd("s", "m").await.unwrap();
        assert!(store.delete("s").await.unwrap());
        assert!(!store.delete("s").await.unwrap());
    }

    #[tokio::test]
    async fn test_closed_store_rejects_calls() {
        let store = MemoryStore::new();
        assert!(store.health_check().await.unwrap());
        store.close().await.unwrap();
        assert!(!store.health_check().await.unwrap());
        let err = store.get("k").await.unwrap_err();
        assert!(err.is_unavailable());
    }
}
