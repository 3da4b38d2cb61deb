//! Token issuance and verification.
//!
//! Purely computational: no store I/O happens here, so revocation and
//! session checks are the orchestrator's job.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use portal_core::config::auth::{AuthConfig, MAX_TTL_SECONDS};
use portal_core::error::AppError;
use portal_entity::account::AccountRole;

use super::claims::{Claims, TokenKind};

/// Why a token failed verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Tampered payload or signed with another key.
    #[error("token signature is invalid")]
    InvalidSignature,
    /// Past its expiry (beyond the configured leeway).
    #[error("token has expired")]
    Expired,
    /// Not a parseable token.
    #[error("token is malformed")]
    Malformed,
}

/// A freshly signed token and the facts needed to revoke it later.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub token_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// Access and refresh tokens bound to the same session.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access: IssuedToken,
    pub refresh: IssuedToken,
}

/// Signs and verifies HS256 bearer tokens.
#[derive(Clone)]
pub struct TokenAuthority {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl std::fmt::Debug for TokenAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenAuthority")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .field("leeway", &self.validation.leeway)
            .finish()
    }
}

impl TokenAuthority {
    /// Build from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = config.leeway_seconds;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            access_ttl: seconds(config.access_ttl_seconds),
            refresh_ttl: seconds(config.refresh_ttl_seconds),
        }
    }

    /// Sign a token with a fresh random token id.
    pub fn issue(
        &self,
        subject: Uuid,
        session: Option<Uuid>,
        role: AccountRole,
        kind: TokenKind,
        ttl: Duration,
    ) -> Result<IssuedToken, AppError> {
        let now = Utc::now();
        let expires_at = now + ttl;
        let claims = Claims {
            sub: subject,
            sid: session,
            jti: Uuid::new_v4(),
            role,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            typ: kind,
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            AppError::internal(format!("Failed to encode {} token: {e}", kind.as_str()))
        })?;

        Ok(IssuedToken {
            token,
            token_id: claims.jti,
            expires_at,
        })
    }

    /// Sign an access token with the configured access TTL.
    pub fn issue_access(
        &self,
        subject: Uuid,
        session: Option<Uuid>,
        role: AccountRole,
    ) -> Result<IssuedToken, AppError> {
        self.issue(subject, session, role, TokenKind::Access, self.access_ttl)
    }

    /// Sign an access and a refresh token, each with its own token id.
    pub fn issue_pair(
        &self,
        subject: Uuid,
        session: Option<Uuid>,
        role: AccountRole,
    ) -> Result<TokenPair, AppError> {
        Ok(TokenPair {
            access: self.issue_access(subject, session, role)?,
            refresh: self.issue(subject, session, role, TokenKind::Refresh, self.refresh_ttl)?,
        })
    }

    /// Check signature and expiry and return the claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                JwtErrorKind::ExpiredSignature => TokenError::Expired,
                JwtErrorKind::InvalidSignature | JwtErrorKind::InvalidAlgorithm => {
                    TokenError::InvalidSignature
                }
                _ => TokenError::Malformed,
            })
    }
}

/// Clamped to [`MAX_TTL_SECONDS`] so `now + ttl` cannot overflow.
fn seconds(value: u64) -> Duration {
    let clamped = value.min(MAX_TTL_SECONDS);
    Duration::seconds(i64::try_from(clamped).unwrap_or(0))
}
