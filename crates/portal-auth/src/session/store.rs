//! Session storage over the key-value store.
//!
//! Each session is a hash under `session:{id}` with an absolute TTL, and
//! each account has a set `user_sessions:{account}` of ids believed active.
//! The two are kept in step without a transaction: the set may briefly
//! name sessions that are gone or inactive, and [`SessionStore::list_active`]
//! prunes those as it reads.

use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use portal_core::config::session::SessionConfig;
use portal_core::result::AppResult;
use portal_core::traits::KeyValueStore;
use portal_entity::session::{DeviceMeta, Session};
use portal_store::{StoreKeys, StoreManager};

/// CRUD over session records and active session sets.
#[derive(Debug, Clone)]
pub struct SessionStore {
    store: StoreManager,
    keys: StoreKeys,
    absolute_ttl: Duration,
    retention: Duration,
}

impl SessionStore {
    pub fn new(store: StoreManager, keys: StoreKeys, config: &SessionConfig) -> Self {
        Self {
            store,
            keys,
            absolute_ttl: Duration::from_secs(config.absolute_ttl_seconds),
            retention: Duration::from_secs(config.terminated_retention_seconds),
        }
    }

    /// Create an active session and add it to the account's set.
    ///
    /// Existing sessions are left alone; single-session policy is the
    /// caller's concern.
    pub async fn create_session(&self, user_id: Uuid, device: &DeviceMeta) -> AppResult<Session> {
        let session = Session::start(Uuid::new_v4(), user_id, device, Utc::now());

        self.store
            .hset_all(
                &self.keys.session(session.session_id),
                &session.to_fields(),
                self.absolute_ttl,
            )
            .await?;
        self.store
            .sadd(
                &self.keys.user_sessions(user_id),
                &session.session_id.to_string(),
            )
            .await?;

        info!(
            user_id = %user_id,
            session_id = %session.session_id,
            device = %session.device_info,
            "Session created"
        );
        Ok(session)
    }

    /// Load a session, whether active or terminated. `None` once purged.
    pub async fn get_session(&self, session_id: Uuid) -> AppResult<Option<Session>> {
        let fields = self.store.hgetall(&self.keys.session(session_id)).await?;
        Ok(Session::from_fields(&fields))
    }

    /// Bump `lastActivity` if the record still exists. The TTL is untouched,
    /// so sessions still expire on their absolute schedule.
    pub async fn touch_activity(&self, session_id: Uuid) -> AppResult<bool> {
        self.store
            .hset_if_exists(
                &self.keys.session(session_id),
                Session::FIELD_LAST_ACTIVITY,
                &Utc::now().to_rfc3339(),
            )
            .await
    }

    /// Active sessions of an account, oldest login first.
    ///
    /// Set members that are missing, inactive, unparseable or owned by
    /// someone else are removed from the set as a side effect.
    pub async fn list_active(&self, user_id: Uuid) -> AppResult<Vec<Session>> {
        let set_key = self.keys.user_sessions(user_id);
        let members = self.store.smembers(&set_key).await?;

        let mut active = Vec::with_capacity(members.len());
        for member in members {
            let session = match member.parse::<Uuid>() {
                Ok(id) => self.get_session(id).await?,
                Err(_) => None,
            };
            match session {
                Some(session) if session.is_usable_by(user_id) => active.push(session),
                _ => {
                    self.store.srem(&set_key, &member).await?;
                    debug!(user_id = %user_id, member = %member, "Pruned stale session id");
                }
            }
        }

        active.sort_by_key(|s| s.login_time);
        Ok(active)
    }

    /// Number of active sessions after pruning.
    pub async fn count_active(&self, user_id: Uuid) -> AppResult<usize> {
        Ok(self.list_active(user_id).await?.len())
    }

    /// Mark a session inactive, drop it from its owner's set and shorten its
    /// TTL to the retention window.
    ///
    /// Returns `false` without writing anything when the session is already
    /// gone or already terminated.
    pub async fn terminate(&self, session_id: Uuid) -> AppResult<bool> {
        let Some(session) = self.get_session(session_id).await? else {
            return Ok(false);
        };
        if !session.is_active {
            return Ok(false);
        }

        let key = self.keys.session(session_id);
        self.store
            .hset_if_exists(&key, Session::FIELD_IS_ACTIVE, "false")
            .await?;
        self.store
            .srem(
                &self.keys.user_sessions(session.user_id),
                &session_id.to_string(),
            )
            .await?;
        self.store.expire(&key, self.retention).await?;

        info!(user_id = %session.user_id, session_id = %session_id, "Session terminated");
        Ok(true)
    }

    /// Terminate every active session of an account, then clear its set.
    ///
    /// Not atomic: a session created by a racing login while this runs may
    /// survive, or lose its set membership.
    pub async fn terminate_all(&self, user_id: Uuid) -> AppResult<usize> {
        let mut terminated = 0;
        for session in self.list_active(user_id).await? {
            if self.terminate(session.session_id).await? {
                terminated += 1;
            }
        }
        self.store.delete(&self.keys.user_sessions(user_id)).await?;

        info!(user_id = %user_id, terminated, "All sessions terminated");
        Ok(terminated)
    }
}
