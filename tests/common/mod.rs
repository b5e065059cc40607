//! Common Test Utilities
//!
//! Shared helpers, fixtures, and test infrastructure.

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::FirstName;
use fake::Fake;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use social_graph::config::{
    CorsSettings, DatabaseSettings, JwtSettings, ServerSettings, SessionSettings, Settings,
    WebSocketSettings,
};
use social_graph::startup::AppState;

pub const TEST_PASSWORD: &str = "TestPassword123!";

/// Settings for an in-memory application
pub fn test_settings() -> Settings {
    Settings {
        server: ServerSettings {
            host: "127.0.0.1".into(),
            port: 0,
            request_timeout_secs: 30,
        },
        database: DatabaseSettings {
            url: None,
            max_connections: 1,
            min_connections: 1,
            acquire_timeout: 1,
            run_migrations: false,
        },
        jwt: JwtSettings {
            secret: "integration-test-secret-0123456789abcdef".into(),
            token_expiry_minutes: 60,
        },
        session: SessionSettings {
            cookie_name: "token".into(),
            cookie_secure: false,
            cookie_domain: None,
        },
        cors: CorsSettings {
            allowed_origins: vec![],
        },
        websocket: WebSocketSettings {
            max_message_size: 65536,
            heartbeat_interval_ms: 45000,
            identify_timeout_secs: 5,
            request_timeout_secs: 5,
        },
        environment: "test".into(),
    }
}

/// Credential carrier for a request
#[derive(Debug, Clone, Copy)]
pub enum Auth<'a> {
    None,
    Bearer(&'a str),
    Cookie(&'a str),
}

/// A user registered through the API
#[derive(Debug, Clone)]
pub struct TestUser {
    pub username: String,
    pub email: String,
    pub token: String,
}

/// Test application over the in-memory store
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_settings(test_settings()).await
    }

    pub async fn with_settings(settings: Settings) -> Self {
        let state = AppState::in_memory(settings);
        Self {
            router: state.router(),
            state,
        }
    }

    /// Send a request with an optional JSON body
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        auth: Auth<'_>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        builder = match auth {
            Auth::None => builder,
            Auth::Bearer(token) => builder.header(header::AUTHORIZATION, format!("Bearer {token}")),
            Auth::Cookie(token) => builder.header(header::COOKIE, format!("token={token}")),
        };
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        self.router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap()
    }

    pub async fn get(&self, uri: &str, auth: Auth<'_>) -> Response {
        self.request(Method::GET, uri, None, auth).await
    }

    pub async fn post_json(&self, uri: &str, body: Value, auth: Auth<'_>) -> Response {
        self.request(Method::POST, uri, Some(body), auth).await
    }

    pub async fn put(&self, uri: &str, auth: Auth<'_>) -> Response {
        self.request(Method::PUT, uri, None, auth).await
    }

    pub async fn delete(&self, uri: &str, auth: Auth<'_>) -> Response {
        self.request(Method::DELETE, uri, None, auth).await
    }

    /// Register and log in a fresh user
    pub async fn create_user(&self) -> TestUser {
        let username = unique_username();
        let email = unique_email();

        let response = self
            .post_json(
                "/api/v1/auth/register",
                json!({"username": username, "email": email, "password": TEST_PASSWORD}),
                Auth::None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let token = self.login(&username, TEST_PASSWORD).await;
        TestUser {
            username,
            email,
            token,
        }
    }

    /// Log in and return the token from the body
    pub async fn login(&self, username_or_email: &str, password: &str) -> String {
        let response = self
            .post_json(
                "/api/v1/auth/login",
                json!({"username_or_email": username_or_email, "password": password}),
                Auth::None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        body_json(response).await["token"]
            .as_str()
            .unwrap()
            .to_string()
    }
}

/// Read a response body as JSON
pub async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Usernames in `items` of a follow list response
pub fn usernames(list: &Value) -> Vec<String> {
    list["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["username"].as_str().unwrap().to_string())
        .collect()
}

/// Generate a unique test email
pub fn unique_email() -> String {
    let email: String = SafeEmail().fake();
    format!("{}.{}", &Uuid::new_v4().simple().to_string()[..8], email)
}

/// Generate a unique lowercase test username (at most 32 characters)
pub fn unique_username() -> String {
    let first: String = FirstName().fake();
    let base: String = first
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(16)
        .collect::<String>()
        .to_lowercase();
    format!("{}_{}", base, &Uuid::new_v4().simple().to_string()[..8])
}
