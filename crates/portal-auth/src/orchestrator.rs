//! Registration, login, refresh, validation and logout policy.
//!
//! The orchestrator is the only place that combines tokens, sessions,
//! revocations and accounts. None of its multi-step flows are atomic: two
//! concurrent logins for one account can both find no active session and
//! both succeed. That case is logged, not prevented.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use portal_core::config::AppConfig;
use portal_core::error::AppError;
use portal_database::AccountRepository;
use portal_entity::account::{Account, AccountRole, NewAccount};
use portal_entity::session::{DeviceMeta, Session};
use portal_store::{StoreKeys, StoreManager};

use crate::error::AuthError;
use crate::jwt::{IssuedToken, TokenAuthority, TokenKind, TokenPair};
use crate::password::{Argon2Hasher, CredentialHasher};
use crate::revocation::RevocationList;
use crate::session::SessionStore;

/// Self-registration request, already shape-checked by the caller.
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Result of a successful registration or login.
#[derive(Debug, Clone, Serialize)]
pub struct AuthOutcome {
    /// The account, with its session pointer already updated.
    pub account: Account,
    /// The session the tokens are bound to.
    pub session: Session,
    pub tokens: TokenPair,
    /// Sessions terminated to make room for this one.
    pub superseded: usize,
}

/// An authenticated caller, produced by [`AuthOrchestrator::validate`].
#[derive(Debug, Clone)]
pub struct Principal {
    pub account: Account,
    /// Session the presented token is bound to.
    pub session_id: Option<Uuid>,
    /// Id of the presented token.
    pub token_id: Uuid,
    /// Expiry of the presented token.
    pub expires_at: DateTime<Utc>,
}

impl Principal {
    pub fn user_id(&self) -> Uuid {
        self.account.id
    }
}

/// Auth business policy over tokens, sessions, revocations and accounts.
#[derive(Clone)]
pub struct AuthOrchestrator {
    tokens: TokenAuthority,
    revocations: RevocationList,
    sessions: SessionStore,
    accounts: Arc<dyn AccountRepository>,
    hasher: Arc<dyn CredentialHasher>,
    revocation_ttl_seconds: u64,
    password_min_length: usize,
}

impl std::fmt::Debug for AuthOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthOrchestrator")
            .field("tokens", &self.tokens)
            .field("revocation_ttl_seconds", &self.revocation_ttl_seconds)
            .field("password_min_length", &self.password_min_length)
            .finish()
    }
}

impl AuthOrchestrator {
    /// Wire every component from configuration over an open store and
    /// account repository.
    pub fn from_config(
        config: &AppConfig,
        store: StoreManager,
        accounts: Arc<dyn AccountRepository>,
    ) -> Result<Self, AppError> {
        let keys = StoreKeys::from_config(&config.session);
        Ok(Self {
            tokens: TokenAuthority::new(&config.auth),
            revocations: RevocationList::new(store.clone(), keys.clone()),
            sessions: SessionStore::new(store, keys, &config.session),
            accounts,
            hasher: Arc::new(Argon2Hasher::new(&config.auth.argon2)?),
            revocation_ttl_seconds: config.auth.effective_revocation_ttl_seconds(),
            password_min_length: config.auth.password_min_length,
        })
    }

    /// Create a `user` account and open its first session.
    pub async fn register(
        &self,
        input: RegisterInput,
        device: DeviceMeta,
    ) -> Result<AuthOutcome, AuthError> {
        let email = normalize_email(&input.email);
        self.check_registration(&email, &input)?;

        if self.accounts.find_by_email(&email).await?.is_some() {
            return Err(AuthError::AlreadyExists);
        }

        let password_hash = self.hash_password(&input.password).await?;
        let mut account = self
            .accounts
            .create(&NewAccount {
                email,
                password_hash,
                first_name: input.first_name.trim().to_string(),
                last_name: input.last_name.trim().to_string(),
                role: AccountRole::User,
            })
            .await?;

        let session = self.sessions.create_session(account.id, &device).await?;
        self.accounts
            .set_current_session(account.id, Some(session.session_id))
            .await?;
        account.current_session_id = Some(session.session_id);

        let tokens = self
            .tokens
            .issue_pair(account.id, Some(session.session_id), account.role)?;

        info!(
            user_id = %account.id,
            session_id = %session.session_id,
            "Account registered"
        );

        Ok(AuthOutcome {
            account,
            session,
            tokens,
            superseded: 0,
        })
    }

    /// Check credentials, supersede existing sessions and open a new one.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        device: DeviceMeta,
    ) -> Result<AuthOutcome, AuthError> {
        let email = normalize_email(email);
        let Some(mut account) = self.accounts.find_by_email(&email).await? else {
            debug!("Login attempt for unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !self.verify_password(password, &account.password_hash).await? {
            warn!(user_id = %account.id, "Login failed: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let existing = self.sessions.list_active(account.id).await?;
        let superseded = if existing.is_empty() {
            0
        } else {
            self.sessions.terminate_all(account.id).await?
        };

        let session = self.sessions.create_session(account.id, &device).await?;
        self.accounts
            .record_login(
                account.id,
                session.session_id,
                session.login_time,
                device.known_ip(),
            )
            .await?;
        account.current_session_id = Some(session.session_id);
        account.last_login_at = Some(session.login_time);
        if let Some(ip) = device.known_ip() {
            account.last_login_ip = Some(ip.to_string());
        }

        let active = self.sessions.count_active(account.id).await?;
        if active > 1 {
            warn!(
                user_id = %account.id,
                active,
                "Concurrent logins left more than one active session"
            );
        }

        let tokens = self
            .tokens
            .issue_pair(account.id, Some(session.session_id), account.role)?;

        info!(
            user_id = %account.id,
            session_id = %session.session_id,
            role = %account.role,
            superseded,
            device = %session.device_info,
            "Login successful"
        );

        Ok(AuthOutcome {
            account,
            session,
            tokens,
            superseded,
        })
    }

    /// Exchange a refresh token for a new access token on the same session.
    ///
    /// The previous access token stays valid until it expires or its session
    /// ends.
    pub async fn refresh(&self, refresh_token: &str) -> Result<IssuedToken, AuthError> {
        let claims = self.tokens.verify(refresh_token).map_err(|e| {
            debug!(reason = %e, "Refresh token rejected");
            AuthError::TokenRefreshFailed
        })?;
        if claims.typ != TokenKind::Refresh {
            return Err(AuthError::TokenRefreshFailed);
        }
        if self.revocations.is_revoked(claims.jti).await? {
            debug!(token_id = %claims.jti, "Revoked refresh token presented");
            return Err(AuthError::TokenRefreshFailed);
        }

        let account = self
            .accounts
            .find_by_id(claims.sub)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if let Some(session_id) = claims.sid {
            self.require_usable_session(session_id, account.id).await?;
        }

        let access = self
            .tokens
            .issue_access(account.id, claims.sid, account.role)?;
        debug!(user_id = %account.id, token_id = %access.token_id, "Access token refreshed");
        Ok(access)
    }

    /// Authenticate an access token.
    ///
    /// Returns `Ok(None)` when the token is sound but its account no longer
    /// exists. On success the bound session's activity time is bumped.
    pub async fn validate(&self, access_token: &str) -> Result<Option<Principal>, AuthError> {
        let claims = self.tokens.verify(access_token)?;
        if claims.typ != TokenKind::Access {
            return Err(AuthError::InvalidToken(None));
        }
        if self.revocations.is_revoked(claims.jti).await? {
            return Err(AuthError::TokenBlacklisted);
        }

        let Some(account) = self.accounts.find_by_id(claims.sub).await? else {
            return Ok(None);
        };

        if let Some(session_id) = claims.sid {
            self.require_usable_session(session_id, account.id).await?;
            self.sessions.touch_activity(session_id).await?;
        }

        Ok(Some(Principal {
            account,
            session_id: claims.sid,
            token_id: claims.jti,
            expires_at: claims.expires_at(),
        }))
    }

    /// End one of the caller's sessions and revoke the presented token.
    ///
    /// Repeating a logout is harmless: the session is already terminated and
    /// the token is simply revoked again.
    pub async fn logout(
        &self,
        user_id: Uuid,
        session_id: Option<Uuid>,
        token_id: Option<Uuid>,
    ) -> Result<(), AuthError> {
        if let Some(session_id) = session_id {
            let owned = self
                .sessions
                .get_session(session_id)
                .await?
                .is_some_and(|s| s.user_id == user_id);
            if owned {
                self.sessions.terminate(session_id).await?;
            }
            self.accounts
                .clear_current_session_if(user_id, session_id)
                .await?;
        }

        if let Some(token_id) = token_id {
            self.revocations
                .revoke(token_id, self.revocation_ttl_seconds)
                .await?;
        }

        info!(user_id = %user_id, session_id = ?session_id, "Logout");
        Ok(())
    }

    /// End every session of the account. Returns how many were active.
    ///
    /// The session pointer is cleared only if it still names the session it
    /// held before termination started, so a login racing this call keeps
    /// its pointer.
    pub async fn logout_all(&self, user_id: Uuid) -> Result<usize, AuthError> {
        let pointer = self
            .accounts
            .find_by_id(user_id)
            .await?
            .and_then(|account| account.current_session_id);
        let terminated = self.sessions.terminate_all(user_id).await?;
        if let Some(session_id) = pointer {
            self.accounts
                .clear_current_session_if(user_id, session_id)
                .await?;
        }
        info!(user_id = %user_id, terminated, "Logged out of all sessions");
        Ok(terminated)
    }

    /// The account's active sessions, oldest first.
    pub async fn list_sessions(&self, user_id: Uuid) -> Result<Vec<Session>, AuthError> {
        Ok(self.sessions.list_active(user_id).await?)
    }

    /// End a session the caller owns.
    ///
    /// Fails with `NotAuthorized` and changes nothing when the session is not
    /// among the caller's active sessions.
    pub async fn terminate_owned(&self, user_id: Uuid, session_id: Uuid) -> Result<(), AuthError> {
        let owned = self
            .sessions
            .list_active(user_id)
            .await?
            .iter()
            .any(|s| s.session_id == session_id);
        if !owned {
            warn!(user_id = %user_id, session_id = %session_id, "Refused to terminate foreign session");
            return Err(AuthError::NotAuthorized);
        }

        self.sessions.terminate(session_id).await?;
        self.accounts
            .clear_current_session_if(user_id, session_id)
            .await?;
        Ok(())
    }

    async fn require_usable_session(
        &self,
        session_id: Uuid,
        user_id: Uuid,
    ) -> Result<Session, AuthError> {
        match self.sessions.get_session(session_id).await? {
            Some(session) if session.is_usable_by(user_id) => Ok(session),
            _ => Err(AuthError::SessionExpiredOrInvalid),
        }
    }

    fn check_registration(&self, email: &str, input: &RegisterInput) -> Result<(), AuthError> {
        if email.is_empty() || !email.contains('@') {
            return Err(AuthError::Validation("A valid email is required".into()));
        }
        if input.password.chars().count() < self.password_min_length {
            return Err(AuthError::Validation(format!(
                "Password must be at least {} characters",
                self.password_min_length
            )));
        }
        if input.first_name.trim().is_empty() || input.last_name.trim().is_empty() {
            return Err(AuthError::Validation(
                "First and last name are required".into(),
            ));
        }
        Ok(())
    }

    async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_owned();
        let hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AppError::internal(format!("Hashing task failed: {e}")))??;
        Ok(hash)
    }

    async fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_owned();
        let hash = hash.to_owned();
        let matches = tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| AppError::internal(format!("Verification task failed: {e}")))??;
        Ok(matches)
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
