//! Integration tests for registration, login, refresh and token checks.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use helpers::{CHROME, TestApp, str_at};

#[tokio::test]
async fn test_register_success() {
    let app = TestApp::new();
    let body = app.register("a@x.com", "secret1").await;

    assert_eq!(body["message"], "User registered successfully");
    assert_eq!(body["user"]["email"], "a@x.com");
    assert_eq!(body["user"]["role"], "user");
    assert!(body["user"].get("passwordHash").is_none());
    assert!(body["tokens"]["access_token"].is_string());
    assert!(body["tokens"]["refresh_token"].is_string());
    assert_eq!(
        body["user"]["currentSessionId"],
        body["tokens"]["sessionId"]
    );
}

#[tokio::test]
async fn test_register_ignores_requested_role() {
    let app = TestApp::new();
    let response = app
        .request(
            "POST",
            "/auth/register",
            Some(json!({
                "email": "boss@x.com",
                "password": "secret1",
                "firstName": "B",
                "lastName": "C",
                "role": "admin",
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["user"]["role"], "user");
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let app = TestApp::new();
    app.register("a@x.com", "secret1").await;

    let response = app
        .request(
            "POST",
            "/auth/register",
            Some(json!({
                "email": "A@X.com",
                "password": "secret2",
                "firstName": "Other",
                "lastName": "Person",
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["success"], false);
    assert_eq!(response.body["statusCode"], 409);
    assert_eq!(response.body["path"], "/auth/register");
    assert_eq!(response.body["error"], "Email already exists");
    assert_eq!(response.code(), "EMAIL_ALREADY_EXISTS");
}

#[tokio::test]
async fn test_register_validation() {
    let app = TestApp::new();
    let response = app
        .request(
            "POST",
            "/auth/register",
            Some(json!({
                "email": "not-an-email",
                "password": "123",
                "firstName": "A",
                "lastName": "B",
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.code(), "VALIDATION_ERROR");
    let error = str_at(&response.body, "/error");
    assert!(error.contains("email"));
}

#[tokio::test]
async fn test_register_password_below_default_minimum() {
    let app = TestApp::new();
    let body = json!({
        "email": "short@x.com",
        "password": "abcde",
        "firstName": "A",
        "lastName": "B",
    });
    let response = app
        .request("POST", "/auth/register", Some(body), None)
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.code(), "VALIDATION_ERROR");
    assert!(str_at(&response.body, "/error").contains("at least 6"));
}

#[tokio::test]
async fn test_register_honours_configured_password_minimum() {
    let app = TestApp::with_config(|config| config.auth.password_min_length = 4);

    let body = app.register("short@x.com", "abcde").await;
    assert_eq!(str_at(&body, "/user/email"), "short@x.com");

    let response = app
        .request(
            "POST",
            "/auth/register",
            Some(json!({
                "email": "shorter@x.com",
                "password": "abc",
                "firstName": "A",
                "lastName": "B",
            })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(str_at(&response.body, "/error").contains("at least 4"));
}

#[tokio::test]
async fn test_malformed_json_uses_envelope() {
    let app = TestApp::new();
    let req = axum::http::Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header("Content-Type", "application/json")
        .body(axum::body::Body::from("{not json"))
        .unwrap();

    let response = app.send(req).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.code(), "VALIDATION_ERROR");
    assert_eq!(response.body["path"], "/auth/login");
}

#[tokio::test]
async fn test_login_success() {
    let app = TestApp::new();
    app.register("a@x.com", "secret1").await;

    let body = app.login("a@x.com", "secret1", CHROME).await;

    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["sessionInfo"]["deviceInfo"], "Chrome Browser");
    assert_eq!(body["sessionInfo"]["sessionId"], body["tokens"]["sessionId"]);
    assert_eq!(body["user"]["currentSessionId"], body["tokens"]["sessionId"]);
}

#[tokio::test]
async fn test_login_invalid_password() {
    let app = TestApp::new();
    app.register("a@x.com", "secret1").await;

    let response = app
        .request(
            "POST",
            "/auth/login",
            Some(json!({ "email": "a@x.com", "password": "wrongpassword" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["message"], "Login failed");
    assert_eq!(response.body["error"], "Invalid email or password");
    assert_eq!(response.code(), "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_login_unknown_email() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            "/auth/login",
            Some(json!({ "email": "nobody@x.com", "password": "secret1" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.code(), "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_profile_and_verify() {
    let app = TestApp::new();
    let body = app.register("a@x.com", "secret1").await;
    let token = str_at(&body, "/tokens/access_token");

    let profile = app.request("GET", "/auth/profile", None, Some(token)).await;
    assert_eq!(profile.status, StatusCode::OK);
    assert_eq!(profile.body["email"], "a@x.com");
    assert_eq!(profile.body["sessionId"], body["tokens"]["sessionId"]);
    assert!(profile.body["tokenId"].is_string());

    let verify = app.request("POST", "/auth/verify", None, Some(token)).await;
    assert_eq!(verify.status, StatusCode::OK);
    assert_eq!(verify.body["valid"], true);
    assert_eq!(verify.body["user"]["email"], "a@x.com");
}

#[tokio::test]
async fn test_protected_route_without_token() {
    let app = TestApp::new();

    let missing = app.request("GET", "/auth/profile", None, None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.code(), "AUTH_FAILED");

    let garbage = app
        .request("GET", "/auth/profile", None, Some("not-a-token"))
        .await;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);
    assert_eq!(garbage.code(), "INVALID_TOKEN");
}

#[tokio::test]
async fn test_refresh_token_flow() {
    let app = TestApp::new();
    let body = app.register("a@x.com", "secret1").await;
    let refresh = str_at(&body, "/tokens/refresh_token");

    let response = app
        .request(
            "POST",
            "/auth/refresh",
            Some(json!({ "refresh_token": refresh })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let access = str_at(&response.body, "/access_token");

    let profile = app.request("GET", "/auth/profile", None, Some(access)).await;
    assert_eq!(profile.status, StatusCode::OK);
    assert_eq!(profile.body["sessionId"], body["tokens"]["sessionId"]);
}

#[tokio::test]
async fn test_tokens_are_not_interchangeable() {
    let app = TestApp::new();
    let body = app.register("a@x.com", "secret1").await;
    let access = str_at(&body, "/tokens/access_token");
    let refresh = str_at(&body, "/tokens/refresh_token");

    let response = app
        .request(
            "POST",
            "/auth/refresh",
            Some(json!({ "refresh_token": access })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["message"], "Token refresh failed");
    assert_eq!(response.code(), "TOKEN_REFRESH_FAILED");

    let profile = app.request("GET", "/auth/profile", None, Some(refresh)).await;
    assert_eq!(profile.status, StatusCode::UNAUTHORIZED);
    assert_eq!(profile.code(), "INVALID_TOKEN");
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let response = app.request("GET", "/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert_eq!(response.body["store"], "up");
    assert_eq!(response.body["database"], "up");
}

#[tokio::test]
async fn test_store_outage_is_503() {
    use portal_core::traits::KeyValueStore;

    let app = TestApp::new();
    app.register("a@x.com", "secret1").await;
    app.store.close().await.unwrap();

    let login = app
        .request(
            "POST",
            "/auth/login",
            Some(json!({ "email": "a@x.com", "password": "secret1" })),
            None,
        )
        .await;
    assert_eq!(login.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(login.code(), "SERVICE_UNAVAILABLE");

    let health = app.request("GET", "/health", None, None).await;
    assert_eq!(health.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(health.body["store"], "down");
}
