//! Authentication and Identity API Tests

use axum::http::{header, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::{
    body_json, test_settings, unique_email, unique_username, Auth, TestApp, TEST_PASSWORD,
};

#[tokio::test]
async fn test_register_returns_created_user_without_password() {
    let app = TestApp::new().await;
    let username = unique_username();
    let email = unique_email();

    let response = app
        .post_json(
            "/api/v1/auth/register",
            json!({"username": username.to_uppercase(), "email": email, "password": TEST_PASSWORD}),
            Auth::None,
        )
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["username"], username);
    assert_eq!(body["email"], email.to_lowercase());
    assert!(body.get("password_hash").is_none());
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn test_register_with_invalid_email_fails() {
    let app = TestApp::new().await;

    let response = app
        .post_json(
            "/api/v1/auth/register",
            json!({"username": unique_username(), "email": "not-an-email", "password": TEST_PASSWORD}),
            Auth::None,
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_checks_username_after_trimming() {
    let app = TestApp::new().await;

    for username in ["   ", " q ", "@me", "a/b"] {
        let response = app
            .post_json(
                "/api/v1/auth/register",
                json!({"username": username, "email": unique_email(), "password": TEST_PASSWORD}),
                Auth::None,
            )
            .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{username:?}");
        let body = body_json(response).await;
        assert!(body["message"].as_str().unwrap().starts_with("username:"));
    }

    let response = app.get("/api/v1/users", Auth::None).await;
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn test_register_with_duplicate_email_or_username_conflicts() {
    let app = TestApp::new().await;
    let user = app.create_user().await;

    let same_email = app
        .post_json(
            "/api/v1/auth/register",
            json!({"username": unique_username(), "email": user.email, "password": TEST_PASSWORD}),
            Auth::None,
        )
        .await;
    assert_eq!(same_email.status(), StatusCode::CONFLICT);

    let same_username = app
        .post_json(
            "/api/v1/auth/register",
            json!({"username": user.username.to_uppercase(), "email": unique_email(), "password": TEST_PASSWORD}),
            Auth::None,
        )
        .await;
    assert_eq!(same_username.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_login_sets_session_cookie() {
    let app = TestApp::new().await;
    let user = app.create_user().await;

    let response = app
        .post_json(
            "/api/v1/auth/login",
            json!({"username_or_email": user.username, "password": TEST_PASSWORD}),
            Auth::None,
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    let body = body_json(response).await;
    let token = body["token"].as_str().unwrap();

    assert!(cookie.starts_with(&format!("token={token}")));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
    assert!(cookie.contains("Path=/"));
}

#[tokio::test]
async fn test_login_by_email_is_case_insensitive_and_accepts_camel_case() {
    let app = TestApp::new().await;
    let user = app.create_user().await;

    let response = app
        .post_json(
            "/api/v1/auth/login",
            json!({"usernameOrEmail": user.email.to_uppercase(), "password": TEST_PASSWORD}),
            Auth::None,
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = TestApp::new().await;
    let user = app.create_user().await;

    let wrong_password = app
        .post_json(
            "/api/v1/auth/login",
            json!({"username_or_email": user.username, "password": "wrong"}),
            Auth::None,
        )
        .await;
    let unknown_user = app
        .post_json(
            "/api/v1/auth/login",
            json!({"username_or_email": "nobody-here", "password": "wrong"}),
            Auth::None,
        )
        .await;

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(wrong_password).await, body_json(unknown_user).await);
}

#[tokio::test]
async fn test_me_resolves_from_cookie_or_bearer() {
    let app = TestApp::new().await;
    let user = app.create_user().await;

    for auth in [Auth::Cookie(&user.token), Auth::Bearer(&user.token)] {
        let response = app.get("/api/v1/users/@me", auth).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["username"], user.username);
        assert_eq!(body["email"], user.email.to_lowercase());
    }
}

#[tokio::test]
async fn test_cookie_takes_precedence_over_header() {
    let app = TestApp::new().await;
    let alice = app.create_user().await;
    let bob = app.create_user().await;

    let response = app
        .request(
            axum::http::Method::GET,
            "/api/v1/users/@me",
            None,
            Auth::Cookie(&alice.token),
        )
        .await;
    assert_eq!(body_json(response).await["username"], alice.username);

    // Both carriers at once
    let request = axum::http::Request::builder()
        .uri("/api/v1/users/@me")
        .header(header::COOKIE, format!("token={}", alice.token))
        .header(header::AUTHORIZATION, format!("Bearer {}", bob.token))
        .body(axum::body::Body::empty())
        .unwrap();
    let response = tower::ServiceExt::oneshot(app.router.clone(), request)
        .await
        .unwrap();
    assert_eq!(body_json(response).await["username"], alice.username);
}

#[tokio::test]
async fn test_stale_cookie_does_not_hide_valid_header() {
    let app = TestApp::new().await;
    let alice = app.create_user().await;

    let request = axum::http::Request::builder()
        .uri("/api/v1/users/@me")
        .header(header::COOKIE, "token=stale.session.token")
        .header(header::AUTHORIZATION, format!("Bearer {}", alice.token))
        .body(axum::body::Body::empty())
        .unwrap();
    let response = tower::ServiceExt::oneshot(app.router.clone(), request)
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["username"], alice.username);
}

#[tokio::test]
async fn test_missing_or_invalid_credentials_are_unauthorized() {
    let app = TestApp::new().await;

    let anonymous = app.get("/api/v1/users/@me", Auth::None).await;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(anonymous).await["message"], "Not authenticated");

    let garbage = app.get("/api/v1/users/@me", Auth::Bearer("not.a.token")).await;
    assert_eq!(garbage.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let app = TestApp::new().await;
    let user = app.create_user().await;

    let response = app
        .request(
            axum::http::Method::POST,
            "/api/v1/auth/logout",
            None,
            Auth::Cookie(&user.token),
        )
        .await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(cookie.starts_with("token=;"));
}

#[tokio::test]
async fn test_logout_clears_cookie_on_configured_domain() {
    let mut settings = test_settings();
    settings.session.cookie_domain = Some("example.com".into());
    let app = TestApp::with_settings(settings).await;
    let user = app.create_user().await;

    let response = app
        .request(
            axum::http::Method::POST,
            "/api/v1/auth/logout",
            None,
            Auth::Cookie(&user.token),
        )
        .await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(cookie.starts_with("token=;"));
    assert!(cookie.contains("Domain=example.com"));
    assert!(cookie.contains("Path=/"));
}
