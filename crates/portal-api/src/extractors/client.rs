//! Caller address and user agent.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::http::{Extensions, HeaderMap, header};

use portal_entity::session::DeviceMeta;

/// Where a request came from, as far as the server can tell.
///
/// The address is taken from the first `X-Forwarded-For` entry, then
/// `X-Real-IP`, then the socket peer when the server was started with
/// connect info.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

impl ClientInfo {
    pub fn from_headers(headers: &HeaderMap, extensions: &Extensions) -> Self {
        let header_str = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        let ip = header_str("x-forwarded-for")
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .or_else(|| header_str("x-real-ip"))
            .map(String::from)
            .or_else(|| {
                extensions
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip().to_string())
            });

        Self {
            ip,
            user_agent: header_str(header::USER_AGENT.as_str()).map(String::from),
        }
    }

    /// Login device metadata, classified from the user agent.
    pub fn device(&self) -> DeviceMeta {
        DeviceMeta::from_request(self.ip.as_deref(), self.user_agent.as_deref())
    }
}

impl<S> FromRequestParts<S> for ClientInfo
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers, &parts.extensions))
    }
}
