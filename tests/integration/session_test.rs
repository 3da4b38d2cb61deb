//! Integration tests for single-session policy, logout and session
//! management.

mod helpers;

use axum::http::StatusCode;
use serde_json::Value;

use helpers::{CHROME, IPHONE, TestApp, str_at};

fn session_ids(body: &Value) -> Vec<String> {
    body["sessions"]
        .as_array()
        .expect("sessions array")
        .iter()
        .map(|s| s["sessionId"].as_str().unwrap_or_default().to_string())
        .collect()
}

#[tokio::test]
async fn test_second_login_supersedes_registration_session() {
    let app = TestApp::new();
    let registered = app.register("a@x.com", "secret1").await;
    let s1 = str_at(&registered, "/tokens/sessionId").to_string();
    let first_token = str_at(&registered, "/tokens/access_token");

    let second = app.login("a@x.com", "secret1", IPHONE).await;
    let s2 = str_at(&second, "/tokens/sessionId").to_string();
    let second_token = str_at(&second, "/tokens/access_token");
    assert_ne!(s1, s2);

    let sessions = app
        .request("GET", "/auth/sessions", None, Some(second_token))
        .await;
    assert_eq!(sessions.status, StatusCode::OK);
    assert_eq!(session_ids(&sessions.body), vec![s2.clone()]);
    assert_eq!(sessions.body["sessions"][0]["deviceInfo"], "Mobile Device");

    let stale = app
        .request("GET", "/auth/profile", None, Some(first_token))
        .await;
    assert_eq!(stale.status, StatusCode::UNAUTHORIZED);
    assert_eq!(stale.code(), "SESSION_EXPIRED");
    assert_eq!(
        stale.body["error"],
        "Your session has expired or is invalid. Please log in again."
    );
}

#[tokio::test]
async fn test_logout_blacklists_token() {
    let app = TestApp::new();
    app.register("a@x.com", "secret1").await;
    let login = app.login("a@x.com", "secret1", CHROME).await;
    let token = str_at(&login, "/tokens/access_token");

    let logout = app.request("POST", "/auth/logout", None, Some(token)).await;
    assert_eq!(logout.status, StatusCode::OK);
    assert_eq!(logout.body["message"], "Logout successful");

    let after = app.request("GET", "/auth/profile", None, Some(token)).await;
    assert_eq!(after.status, StatusCode::UNAUTHORIZED);
    assert_eq!(after.code(), "TOKEN_BLACKLISTED");
    assert_eq!(
        after.body["error"],
        "Your session has been terminated. Please log in again."
    );

    // A fresh login still works after logging out.
    app.login("a@x.com", "secret1", CHROME).await;
}

#[tokio::test]
async fn test_logout_ends_refresh_for_the_session() {
    let app = TestApp::new();
    let registered = app.register("a@x.com", "secret1").await;
    let token = str_at(&registered, "/tokens/access_token");
    let refresh = str_at(&registered, "/tokens/refresh_token");

    app.request("POST", "/auth/logout", None, Some(token)).await;

    let response = app
        .request(
            "POST",
            "/auth/refresh",
            Some(serde_json::json!({ "refresh_token": refresh })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.code(), "SESSION_EXPIRED");
}

#[tokio::test]
async fn test_logout_all() {
    let app = TestApp::new();
    let registered = app.register("a@x.com", "secret1").await;
    let token = str_at(&registered, "/tokens/access_token");

    let response = app
        .request("POST", "/auth/logout-all", None, Some(token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["message"], "All sessions terminated successfully");

    let after = app.request("GET", "/auth/sessions", None, Some(token)).await;
    assert_eq!(after.status, StatusCode::UNAUTHORIZED);
    assert_eq!(after.code(), "SESSION_EXPIRED");
}

#[tokio::test]
async fn test_terminate_own_session() {
    let app = TestApp::new();
    let registered = app.register("a@x.com", "secret1").await;
    let token = str_at(&registered, "/tokens/access_token");
    let session = str_at(&registered, "/tokens/sessionId");

    let response = app
        .request(
            "DELETE",
            &format!("/auth/sessions/{session}"),
            None,
            Some(token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["message"], "Session terminated successfully");

    let after = app.request("GET", "/auth/profile", None, Some(token)).await;
    assert_eq!(after.code(), "SESSION_EXPIRED");
}

#[tokio::test]
async fn test_cannot_terminate_foreign_session() {
    let app = TestApp::new();
    let alice = app.register("alice@x.com", "secret1").await;
    let bob = app.register("bob@x.com", "secret2").await;
    let alice_token = str_at(&alice, "/tokens/access_token");
    let bob_token = str_at(&bob, "/tokens/access_token");
    let bob_session = str_at(&bob, "/tokens/sessionId");

    let response = app
        .request(
            "DELETE",
            &format!("/auth/sessions/{bob_session}"),
            None,
            Some(alice_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["message"], "Session termination failed");
    assert_eq!(response.code(), "SESSION_NOT_AUTHORIZED");

    let bob_profile = app
        .request("GET", "/auth/profile", None, Some(bob_token))
        .await;
    assert_eq!(bob_profile.status, StatusCode::OK);

    let garbage = app
        .request("DELETE", "/auth/sessions/not-a-uuid", None, Some(alice_token))
        .await;
    assert_eq!(garbage.code(), "SESSION_NOT_AUTHORIZED");
}

#[tokio::test]
async fn test_session_records_client_address() {
    let app = TestApp::new();
    app.register("a@x.com", "secret1").await;

    let login = app
        .request_with_headers(
            "POST",
            "/auth/login",
            Some(serde_json::json!({ "email": "a@x.com", "password": "secret1" })),
            None,
            &[
                ("user-agent", CHROME),
                ("x-forwarded-for", "203.0.113.9, 10.0.0.1"),
            ],
        )
        .await;
    assert_eq!(login.status, StatusCode::OK);
    let token = str_at(&login.body, "/tokens/access_token");

    let sessions = app.request("GET", "/auth/sessions", None, Some(token)).await;
    let session = &sessions.body["sessions"][0];
    assert_eq!(session["ipAddress"], "203.0.113.9");
    assert_eq!(session["userAgent"], CHROME);
    assert_eq!(session["isActive"], true);

    let profile = app.request("GET", "/auth/profile", None, Some(token)).await;
    assert!(profile.body["lastLoginAt"].is_string());
}
