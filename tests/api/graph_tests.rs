//! Follow Graph API Tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;

use crate::common::{body_json, usernames, Auth, TestApp};

async fn view(app: &TestApp, uri: &str) -> serde_json::Value {
    let response = app.get(uri, Auth::None).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

#[tokio::test]
async fn test_follow_updates_both_views() {
    let app = TestApp::new().await;
    let alice = app.create_user().await;
    let bob = app.create_user().await;

    let response = app
        .put(
            &format!("/api/v1/users/@me/following/{}", bob.username),
            Auth::Cookie(&alice.token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["username"], alice.username);

    let following = view(&app, &format!("/api/v1/users/{}/following", alice.username)).await;
    let followers = view(&app, &format!("/api/v1/users/{}/followers", bob.username)).await;

    assert_eq!(usernames(&following), vec![bob.username.clone()]);
    assert_eq!(usernames(&followers), vec![alice.username.clone()]);
    assert_eq!(following["count"], 1);
    assert_eq!(followers["count"], 1);
}

#[tokio::test]
async fn test_follow_is_idempotent() {
    let app = TestApp::new().await;
    let alice = app.create_user().await;
    let bob = app.create_user().await;
    let uri = format!("/api/v1/users/@me/following/{}", bob.username);

    for _ in 0..2 {
        let response = app.put(&uri, Auth::Bearer(&alice.token)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let followers = view(&app, &format!("/api/v1/users/{}/followers", bob.username)).await;
    assert_eq!(followers["count"], 1);
}

#[tokio::test]
async fn test_unfollow_restores_prior_state_and_repeat_is_noop() {
    let app = TestApp::new().await;
    let alice = app.create_user().await;
    let bob = app.create_user().await;
    let uri = format!("/api/v1/users/@me/following/{}", bob.username);

    app.put(&uri, Auth::Bearer(&alice.token)).await;
    for _ in 0..2 {
        let response = app.delete(&uri, Auth::Bearer(&alice.token)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let following = view(&app, &format!("/api/v1/users/{}/following", alice.username)).await;
    let followers = view(&app, &format!("/api/v1/users/{}/followers", bob.username)).await;
    assert_eq!(following["count"], 0);
    assert_eq!(followers["count"], 0);
}

#[tokio::test]
async fn test_follow_target_is_case_insensitive() {
    let app = TestApp::new().await;
    let alice = app.create_user().await;
    let bob = app.create_user().await;

    let response = app
        .put(
            &format!("/api/v1/users/@me/following/{}", bob.username.to_uppercase()),
            Auth::Bearer(&alice.token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .get("/api/v1/users/@me/following", Auth::Bearer(&alice.token))
        .await;
    assert_eq!(usernames(&body_json(response).await), vec![bob.username]);
}

#[tokio::test]
async fn test_follow_unknown_user_is_not_found() {
    let app = TestApp::new().await;
    let alice = app.create_user().await;

    let response = app
        .put(
            "/api/v1/users/@me/following/does-not-exist",
            Auth::Bearer(&alice.token),
        )
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["message"], "Target user not found");
}

#[tokio::test]
async fn test_graph_mutations_require_identity() {
    let app = TestApp::new().await;
    let bob = app.create_user().await;
    let uri = format!("/api/v1/users/@me/following/{}", bob.username);

    assert_eq!(app.put(&uri, Auth::None).await.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(app.delete(&uri, Auth::None).await.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        app.get("/api/v1/users/@me/followers", Auth::None).await.status(),
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn test_my_followers_view() {
    let app = TestApp::new().await;
    let alice = app.create_user().await;
    let bob = app.create_user().await;
    let carol = app.create_user().await;

    for follower in [&alice, &carol] {
        app.put(
            &format!("/api/v1/users/@me/following/{}", bob.username),
            Auth::Bearer(&follower.token),
        )
        .await;
    }

    let response = app
        .get("/api/v1/users/@me/followers", Auth::Cookie(&bob.token))
        .await;
    let body = body_json(response).await;

    assert_eq!(body["count"], 2);
    assert_eq!(usernames(&body), vec![alice.username, carol.username]);
}

#[tokio::test]
async fn test_user_list_hides_other_users_email() {
    let app = TestApp::new().await;
    let alice = app.create_user().await;
    let bob = app.create_user().await;

    let response = app.get("/api/v1/users", Auth::Bearer(&alice.token)).await;
    let users = body_json(response).await;
    let users = users.as_array().unwrap();

    let find = |name: &str| {
        users
            .iter()
            .find(|u| u["username"] == name)
            .cloned()
            .unwrap()
    };
    assert_eq!(find(&alice.username)["email"], alice.email.to_lowercase());
    assert!(find(&bob.username).get("email").is_none());
}

#[tokio::test]
async fn test_views_of_unknown_user_are_not_found() {
    let app = TestApp::new().await;

    let response = app.get("/api/v1/users/nobody/followers", Auth::None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
