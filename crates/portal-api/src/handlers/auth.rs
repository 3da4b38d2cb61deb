//! Auth handlers: registration, login, refresh, verification, logout and
//! session management.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use uuid::Uuid;

use portal_entity::session::DeviceMeta;

use crate::dto::request::{LoginRequest, RefreshRequest, RegisterRequest};
use crate::dto::response::{
    LoginResponse, MessageResponse, RefreshResponse, RegisterResponse, SessionsResponse,
    TokensResponse, UserResponse, VerifyResponse,
};
use crate::error::ApiError;
use crate::extractors::{AuthUser, ClientInfo, ValidatedJson};
use crate::state::AppState;

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let outcome = state
        .orchestrator
        .register(req.into(), DeviceMeta::registration())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user: UserResponse::from(&outcome.account),
            tokens: TokensResponse::from(&outcome),
            message: "User registered successfully".to_string(),
        }),
    ))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    client: ClientInfo,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let outcome = state
        .orchestrator
        .login(&req.email, &req.password, client.device())
        .await?;

    Ok(Json(LoginResponse::from(&outcome)))
}

/// POST /auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RefreshRequest>,
) -> Result<Json<RefreshResponse>, ApiError> {
    let access = state.orchestrator.refresh(&req.refresh_token).await?;

    Ok(Json(RefreshResponse {
        access_token: access.token,
        expires_at: access.expires_at,
    }))
}

/// GET /auth/profile
pub async fn profile(auth: AuthUser) -> Json<UserResponse> {
    Json(UserResponse::from(&auth.0))
}

/// POST /auth/verify
pub async fn verify(auth: AuthUser) -> Json<VerifyResponse> {
    Json(VerifyResponse {
        valid: true,
        user: UserResponse::from(&auth.0),
    })
}

/// POST /auth/logout
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .orchestrator
        .logout(auth.user_id(), auth.session_id, Some(auth.token_id))
        .await?;

    Ok(Json(MessageResponse::new("Logout successful")))
}

/// POST /auth/logout-all
pub async fn logout_all(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<MessageResponse>, ApiError> {
    state.orchestrator.logout_all(auth.user_id()).await?;

    Ok(Json(MessageResponse::new(
        "All sessions terminated successfully",
    )))
}

/// GET /auth/sessions
pub async fn list_sessions(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<SessionsResponse>, ApiError> {
    let sessions = state.orchestrator.list_sessions(auth.user_id()).await?;
    Ok(Json(SessionsResponse { sessions }))
}

/// DELETE /auth/sessions/{session_id}
///
/// An id that is not a UUID cannot name one of the caller's sessions, so it
/// fails the same way as a foreign session.
pub async fn terminate_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(session_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let session_id = session_id
        .parse::<Uuid>()
        .map_err(|_| ApiError(portal_auth::AuthError::NotAuthorized))?;

    state
        .orchestrator
        .terminate_owned(auth.user_id(), session_id)
        .await?;

    Ok(Json(MessageResponse::new("Session terminated successfully")))
}
