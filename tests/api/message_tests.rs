//! Message API Tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::{body_json, Auth, TestApp};

#[tokio::test]
async fn test_post_and_list_messages() {
    let app = TestApp::new().await;
    let user = app.create_user().await;

    let response = app
        .post_json(
            "/api/v1/messages",
            json!({"body": "hello graph"}),
            Auth::Cookie(&user.token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app.get("/api/v1/messages", Auth::None).await;
    let messages = body_json(response).await;
    assert_eq!(messages.as_array().unwrap().len(), 1);
    assert_eq!(messages[0]["body"], "hello graph");
}

#[tokio::test]
async fn test_post_message_requires_identity() {
    let app = TestApp::new().await;

    let response = app
        .post_json("/api/v1/messages", json!({"body": "hi"}), Auth::None)
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_empty_message_is_rejected() {
    let app = TestApp::new().await;
    let user = app.create_user().await;

    let response = app
        .post_json("/api/v1/messages", json!({"body": ""}), Auth::Bearer(&user.token))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
