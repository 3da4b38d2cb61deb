//! Auth failure taxonomy.
//!
//! Each variant has a stable machine-readable [`AuthError::code`], a short
//! [`AuthError::summary`] for the envelope `message`, and a `Display` text
//! meant for end users. Internal causes stay in `source()` and never reach
//! the message.

use thiserror::Error;

use portal_core::error::{AppError, ErrorKind};

use crate::jwt::TokenError;

/// Typed failure of an auth operation.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Email already exists")]
    AlreadyExists,

    #[error("Your session has expired or is invalid. Please log in again.")]
    SessionExpiredOrInvalid,

    #[error("Your session has been terminated. Please log in again.")]
    TokenBlacklisted,

    #[error("Your session has expired or is invalid. Please log in again.")]
    TokenRefreshFailed,

    #[error("User account not found. Please log in again.")]
    UserNotFound,

    #[error("The specified session was not found or you are not authorized to terminate it.")]
    NotAuthorized,

    #[error("Invalid or expired token")]
    InvalidToken(#[source] Option<TokenError>),

    #[error("Missing or malformed Authorization header")]
    MissingCredentials,

    #[error("{0}")]
    Validation(String),

    #[error("Authentication service is temporarily unavailable")]
    Unavailable(#[source] AppError),

    #[error("An unexpected error occurred")]
    Internal(#[source] AppError),
}

impl AuthError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::AlreadyExists => "EMAIL_ALREADY_EXISTS",
            Self::SessionExpiredOrInvalid => "SESSION_EXPIRED",
            Self::TokenBlacklisted => "TOKEN_BLACKLISTED",
            Self::TokenRefreshFailed => "TOKEN_REFRESH_FAILED",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::NotAuthorized => "SESSION_NOT_AUTHORIZED",
            Self::InvalidToken(_) => "INVALID_TOKEN",
            Self::MissingCredentials => "AUTH_FAILED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Unavailable(_) => "SERVICE_UNAVAILABLE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// HTTP status the boundary should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::AlreadyExists => 409,
            Self::Validation(_) => 400,
            Self::Unavailable(_) => 503,
            Self::Internal(_) => 500,
            _ => 401,
        }
    }

    /// Short headline of what failed.
    pub fn summary(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "Login failed",
            Self::AlreadyExists => "Registration failed",
            Self::TokenRefreshFailed => "Token refresh failed",
            Self::NotAuthorized => "Session termination failed",
            Self::Validation(_) => "Validation failed",
            Self::Unavailable(_) => "Service unavailable",
            Self::Internal(_) => "Internal server error",
            _ => "Authentication failed",
        }
    }

    /// Whether the failure is the caller's fault rather than ours.
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        if err.is_unavailable() {
            return Self::Unavailable(err);
        }
        match err.kind {
            ErrorKind::Conflict => Self::AlreadyExists,
            _ => Self::Internal(err),
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        Self::InvalidToken(Some(err))
    }
}
