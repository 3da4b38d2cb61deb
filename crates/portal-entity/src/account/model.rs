//! Account entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::role::AccountRole;

/// A registered portal account.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Unique account identifier.
    pub id: Uuid,
    /// Login email, stored lowercased.
    pub email: String,
    /// Argon2 password hash. Never serialized.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    /// Account role.
    pub role: AccountRole,
    /// Session believed active. A hint only; the key-value store decides
    /// whether a session is usable.
    pub current_session_id: Option<Uuid>,
    /// Last successful login time.
    pub last_login_at: Option<DateTime<Utc>>,
    /// Client address of the last successful login.
    pub last_login_ip: Option<String>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to create a new account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    /// Pre-hashed password.
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: AccountRole,
}
