//! Completes error envelopes with request context and logs the failure.

use axum::Json;
use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use crate::error::{ErrorDetails, ErrorEnvelope};
use crate::extractors::ClientInfo;

/// Rewrites any response carrying [`ErrorDetails`] into the full envelope.
pub async fn error_envelope(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let client = ClientInfo::from_headers(request.headers(), request.extensions());

    let response = next.run(request).await;

    let Some(details) = response.extensions().get::<ErrorDetails>().cloned() else {
        return response;
    };

    warn!(
        method = %method,
        path = %path,
        ip = client.ip.as_deref().unwrap_or("unknown"),
        user_agent = client.user_agent.as_deref().unwrap_or("unknown"),
        status = details.status.as_u16(),
        code = details.code,
        "Request failed"
    );

    let (mut parts, _) = response.into_parts();
    let envelope = ErrorEnvelope::new(&details, &path);
    let fresh = (details.status, Json(envelope)).into_response();
    let (fresh_parts, body) = fresh.into_parts();
    parts.headers = fresh_parts.headers;
    Response::from_parts(parts, body)
}
