//! In-memory account repository for tests and local development.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use uuid::Uuid;

use portal_core::error::AppError;
use portal_core::result::AppResult;
use portal_entity::account::{Account, NewAccount};

use super::account::AccountRepository;

/// Account repository held in process memory.
///
/// The email index is claimed before the account row is inserted, so two
/// concurrent registrations for one email cannot both succeed.
#[derive(Debug, Clone, Default)]
pub struct MemoryAccountRepository {
    accounts: Arc<DashMap<Uuid, Account>>,
    by_email: Arc<DashMap<String, Uuid>>,
}

impl MemoryAccountRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn update<F>(&self, id: Uuid, f: F) -> bool
    where
        F: FnOnce(&mut Account),
    {
        match self.accounts.get_mut(&id) {
            Some(mut account) => {
                f(&mut account);
                account.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl AccountRepository for MemoryAccountRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Account>> {
        Ok(self.accounts.get(&id).map(|a| a.clone()))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>> {
        let id = self.by_email.get(&email.to_lowercase()).map(|id| *id);
        Ok(id.and_then(|id| self.accounts.get(&id).map(|a| a.clone())))
    }

    async fn create(&self, data: &NewAccount) -> AppResult<Account> {
        let id = Uuid::new_v4();
        match self.by_email.entry(data.email.to_lowercase()) {
            Entry::Occupied(_) => return Err(AppError::conflict("Email already exists")),
            Entry::Vacant(slot) => {
                slot.insert(id);
            }
        }

        let now = Utc::now();
        let account = Account {
            id,
            email: data.email.clone(),
            password_hash: data.password_hash.clone(),
            first_name: data.first_name.clone(),
            last_name: data.last_name.clone(),
            role: data.role,
            current_session_id: None,
            last_login_at: None,
            last_login_ip: None,
            created_at: now,
            updated_at: now,
        };
        self.accounts.insert(id, account.clone());
        Ok(account)
    }

    async fn record_login(
        &self,
        id: Uuid,
        session_id: Uuid,
        at: DateTime<Utc>,
        ip: Option<&str>,
    ) -> AppResult<()> {
        self.update(id, |account| {
            account.current_session_id = Some(session_id);
            account.last_login_at = Some(at);
            if let Some(ip) = ip {
                account.last_login_ip = Some(ip.to_string());
            }
        });
        Ok(())
    }

    async fn set_current_session(&self, id: Uuid, session_id: Option<Uuid>) -> AppResult<()> {
        self.update(id, |account| account.current_session_id = session_id);
        Ok(())
    }

    async fn clear_current_session_if(&self, id: Uuid, session_id: Uuid) -> AppResult<bool> {
        let mut cleared = false;
        self.update(id, |account| {
            if account.current_session_id == Some(session_id) {
                account.current_session_id = None;
                cleared = true;
            }
        });
        Ok(cleared)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
