//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use portal_auth::{AuthOutcome, Principal};
use portal_entity::account::{Account, AccountRole};
use portal_entity::session::Session;

/// Account as shown to its owner. Never includes the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: AccountRole,
    pub current_session_id: Option<Uuid>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Session of the presented token, on authenticated routes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<Uuid>,
    /// Id of the presented token, on authenticated routes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_id: Option<Uuid>,
}

impl From<&Account> for UserResponse {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            email: account.email.clone(),
            first_name: account.first_name.clone(),
            last_name: account.last_name.clone(),
            role: account.role,
            current_session_id: account.current_session_id,
            last_login_at: account.last_login_at,
            created_at: account.created_at,
            updated_at: account.updated_at,
            session_id: None,
            token_id: None,
        }
    }
}

impl From<&Principal> for UserResponse {
    fn from(principal: &Principal) -> Self {
        Self {
            session_id: principal.session_id,
            token_id: Some(principal.token_id),
            ..Self::from(&principal.account)
        }
    }
}

/// Token pair handed out at registration and login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokensResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(rename = "sessionId")]
    pub session_id: Uuid,
    #[serde(rename = "accessExpiresAt")]
    pub access_expires_at: DateTime<Utc>,
    #[serde(rename = "refreshExpiresAt")]
    pub refresh_expires_at: DateTime<Utc>,
}

impl From<&AuthOutcome> for TokensResponse {
    fn from(outcome: &AuthOutcome) -> Self {
        Self {
            access_token: outcome.tokens.access.token.clone(),
            refresh_token: outcome.tokens.refresh.token.clone(),
            session_id: outcome.session.session_id,
            access_expires_at: outcome.tokens.access.expires_at,
            refresh_expires_at: outcome.tokens.refresh.expires_at,
        }
    }
}

/// Registration response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user: UserResponse,
    pub tokens: TokensResponse,
    pub message: String,
}

/// Summary of the session opened by a login.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub session_id: Uuid,
    pub login_time: DateTime<Utc>,
    pub device_info: String,
}

/// Login response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: UserResponse,
    pub tokens: TokensResponse,
    pub message: String,
    pub session_info: SessionInfo,
}

impl From<&AuthOutcome> for LoginResponse {
    fn from(outcome: &AuthOutcome) -> Self {
        Self {
            user: UserResponse::from(&outcome.account),
            tokens: TokensResponse::from(outcome),
            message: "Login successful".to_string(),
            session_info: SessionInfo {
                session_id: outcome.session.session_id,
                login_time: outcome.session.login_time,
                device_info: outcome.session.device_info.clone(),
            },
        }
    }
}

/// Refresh response: only a new access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access_token: String,
    #[serde(rename = "expiresAt")]
    pub expires_at: DateTime<Utc>,
}

/// Token verification response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub valid: bool,
    pub user: UserResponse,
}

/// Active sessions of the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsResponse {
    pub sessions: Vec<Session>,
}

/// Simple message response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Liveness of the service and its backends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub store: String,
    pub database: String,
}
