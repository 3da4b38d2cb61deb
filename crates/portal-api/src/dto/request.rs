//! Request DTOs with validation.
//!
//! Field names are camelCase on the wire; snake_case spellings are accepted
//! too.

use serde::Deserialize;
use validator::Validate;

use portal_auth::RegisterInput;

/// Registration request body.
///
/// Any `role` sent by the client is ignored; self-registered accounts are
/// always plain users.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,
    /// Length policy is configurable and enforced by the orchestrator.
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
    #[serde(alias = "first_name")]
    #[validate(length(min = 1, message = "firstName is required"))]
    pub first_name: String,
    #[serde(alias = "last_name")]
    #[validate(length(min = 1, message = "lastName is required"))]
    pub last_name: String,
}

impl From<RegisterRequest> for RegisterInput {
    fn from(req: RegisterRequest) -> Self {
        Self {
            email: req.email,
            password: req.password,
            first_name: req.first_name,
            last_name: req.last_name,
        }
    }
}

/// Login request body.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// Token refresh request body.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RefreshRequest {
    #[serde(alias = "refreshToken")]
    #[validate(length(min = 1, message = "refresh_token is required"))]
    pub refresh_token: String,
}
