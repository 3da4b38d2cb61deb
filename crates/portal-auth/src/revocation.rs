//! TTL-bound blacklist of token ids.
//!
//! A marker outlives the token only if the caller picks a TTL at least as
//! long as the token's remaining lifetime. Once the marker expires the token
//! id counts as never revoked.

use std::time::Duration;

use tracing::debug;
use uuid::Uuid;

use portal_core::result::AppResult;
use portal_core::traits::KeyValueStore;
use portal_store::{StoreKeys, StoreManager};

const MARKER: &str = "blacklisted";

/// Revocation markers keyed by token id.
#[derive(Debug, Clone)]
pub struct RevocationList {
    store: StoreManager,
    keys: StoreKeys,
}

impl RevocationList {
    pub fn new(store: StoreManager, keys: StoreKeys) -> Self {
        Self { store, keys }
    }

    /// Mark `token_id` revoked for `ttl_seconds`.
    ///
    /// A zero TTL is already expired, so nothing is written.
    pub async fn revoke(&self, token_id: Uuid, ttl_seconds: u64) -> AppResult<()> {
        if ttl_seconds == 0 {
            debug!(token_id = %token_id, "Skipping revocation with zero TTL");
            return Ok(());
        }
        self.store
            .set(
                &self.keys.blacklist(&token_id.to_string()),
                MARKER,
                Duration::from_secs(ttl_seconds),
            )
            .await?;
        debug!(token_id = %token_id, ttl_seconds, "Token revoked");
        Ok(())
    }

    /// Whether a live marker exists for `token_id`.
    pub async fn is_revoked(&self, token_id: Uuid) -> AppResult<bool> {
        self.store
            .exists(&self.keys.blacklist(&token_id.to_string()))
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use portal_store::memory::MemoryStore;

    use super::*;

    fn list() -> RevocationList {
        let store = StoreManager::from_provider(Arc::new(MemoryStore::new()));
        RevocationList::new(store, StoreKeys::default())
    }

    #[tokio::test]
    async fn test_revoke_is_immediate() {
        let revocations = list();
        let id = Uuid::new_v4();
        assert!(!revocations.is_revoked(id).await.unwrap());
        revocations.revoke(id, 60).await.unwrap();
        assert!(revocations.is_revoked(id).await.unwrap());
        assert!(!revocations.is_revoked(Uuid::new_v4()).await.unwrap());
    }

    #[tokio::test]
    async fn test_zero_ttl_is_never_revoked() {
        let revocations = list();
        let id = Uuid::new_v4();
        revocations.revoke(id, 0).await.unwrap();
        assert!(!revocations.is_revoked(id).await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_marker_lapses_after_ttl() {
        let revocations = list();
        let id = Uuid::new_v4();
        revocations.revoke(id, 30).await.unwrap();
        tokio::time::advance(Duration::from_secs(29)).await;
        assert!(revocations.is_revoked(id).await.unwrap());
        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(!revocations.is_revoked(id).await.unwrap());
    }
}
