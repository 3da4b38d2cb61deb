//! Maps [`AuthError`] to HTTP responses.
//!
//! The handler-side response already carries the envelope body, but
//! `path` is only known to the request. [`crate::middleware::envelope`]
//! finds the [`ErrorDetails`] extension, fills in the path and logs the
//! failure with request context.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use portal_auth::AuthError;
use portal_core::error::AppError;

/// A failure leaving a handler or extractor.
#[derive(Debug)]
pub struct ApiError(pub AuthError);

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self(AuthError::Validation(message.into()))
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self(err)
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err.into())
    }
}

/// The request-independent part of an error envelope.
#[derive(Debug, Clone)]
pub struct ErrorDetails {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: &'static str,
    pub error: String,
}

impl From<&AuthError> for ErrorDetails {
    fn from(err: &AuthError) -> Self {
        Self {
            status: StatusCode::from_u16(err.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            code: err.code(),
            message: err.summary(),
            error: err.to_string(),
        }
    }
}

/// Uniform error body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    pub success: bool,
    pub status_code: u16,
    pub timestamp: DateTime<Utc>,
    pub path: String,
    /// Short headline, e.g. "Login failed".
    pub message: String,
    /// User-facing explanation.
    pub error: String,
    /// Machine-readable code.
    pub code: String,
}

impl ErrorEnvelope {
    pub fn new(details: &ErrorDetails, path: &str) -> Self {
        Self {
            success: false,
            status_code: details.status.as_u16(),
            timestamp: Utc::now(),
            path: path.to_string(),
            message: details.message.to_string(),
            error: details.error.clone(),
            code: details.code.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if !self.0.is_client_error() {
            let cause = std::error::Error::source(&self.0).map(ToString::to_string);
            tracing::error!(code = self.0.code(), cause = ?cause, "Request failed on the server side");
        }

        let details = ErrorDetails::from(&self.0);
        let mut response = (details.status, Json(ErrorEnvelope::new(&details, ""))).into_response();
        response.extensions_mut().insert(details);
        response
    }
}
