//! Account repository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use portal_core::result::AppResult;
use portal_entity::account::{Account, NewAccount};

/// Persistence for portal accounts.
///
/// Implementations report infrastructure failures as `Database` errors and
/// duplicate emails as `Conflict`; a missing account is `Ok(None)`.
#[async_trait]
pub trait AccountRepository: Send + Sync + std::fmt::Debug + 'static {
    /// Find an account by primary key.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Account>>;

    /// Find an account by email (case-insensitive).
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>>;

    /// Insert a new account. Fails with `Conflict` if the email is taken.
    async fn create(&self, data: &NewAccount) -> AppResult<Account>;

    /// Record a successful login and point the account at its new session.
    async fn record_login(
        &self,
        id: Uuid,
        session_id: Uuid,
        at: DateTime<Utc>,
        ip: Option<&str>,
    ) -> AppResult<()>;

    /// Overwrite the current session pointer.
    async fn set_current_session(&self, id: Uuid, session_id: Option<Uuid>) -> AppResult<()>;

    /// Clear the current session pointer only if it still names `session_id`.
    /// Returns whether it was cleared.
    async fn clear_current_session_if(&self, id: Uuid, session_id: Uuid) -> AppResult<bool>;

    /// Check that the backing store is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
