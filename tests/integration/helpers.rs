//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use portal_core::config::AppConfig;
use portal_core::config::auth::Argon2Config;
use portal_database::AccountBackend;
use portal_store::StoreManager;
use portal_store::memory::MemoryStore;

pub const CHROME: &str = "Mozilla/5.0 (Windows NT 10.0) AppleWebKit/537.36 Chrome/120.0 Safari/537.36";
pub const IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0) Mobile/15E148 Safari/604.1";

/// In-process application over in-memory backends.
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Raw handle to the key-value store behind the app
    pub store: MemoryStore,
    /// Account backend behind the app
    pub accounts: AccountBackend,
}

impl TestApp {
    /// Create a new test application with cheap password hashing.
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Like [`TestApp::new`], with `adjust` applied to the config last.
    pub fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = "integration-test-secret".to_string();
        config.auth.argon2 = Argon2Config {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        };
        adjust(&mut config);

        let store = MemoryStore::new();
        let accounts = AccountBackend::in_memory();
        let router = portal_api::build_app(
            config,
            StoreManager::from_provider(Arc::new(store.clone())),
            accounts.repository(),
        )
        .expect("Failed to build app");

        Self {
            router,
            store,
            accounts,
        }
    }

    /// Register an account and return the response body.
    pub async fn register(&self, email: &str, password: &str) -> Value {
        let response = self
            .request(
                "POST",
                "/auth/register",
                Some(json!({
                    "email": email,
                    "password": password,
                    "firstName": "Test",
                    "lastName": "User",
                })),
                None,
            )
            .await;
        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "Registration failed: {:?}",
            response.body
        );
        response.body
    }

    /// Log in from a given user agent and return the response body.
    pub async fn login(&self, email: &str, password: &str, user_agent: &str) -> Value {
        let response = self
            .request_with_headers(
                "POST",
                "/auth/login",
                Some(json!({ "email": email, "password": password })),
                None,
                &[("user-agent", user_agent)],
            )
            .await;
        assert_eq!(
            response.status,
            StatusCode::OK,
            "Login failed: {:?}",
            response.body
        );
        response.body
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        self.request_with_headers(method, path, body, token, &[])
            .await
    }

    /// Make an HTTP request with extra headers
    pub async fn request_with_headers(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }
        for (name, value) in headers {
            req = req.header(*name, *value);
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        self.send(req).await
    }

    /// Send a prebuilt request
    pub async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// The envelope `code` of an error response.
    pub fn code(&self) -> &str {
        self.body["code"].as_str().unwrap_or_default()
    }
}

/// Pull a string field out of a JSON body by pointer.
pub fn str_at<'a>(body: &'a Value, pointer: &str) -> &'a str {
    body.pointer(pointer)
        .and_then(Value::as_str)
        .unwrap_or_else(|| panic!("missing {pointer} in {body}"))
}
