//! Route Configuration
//!
//! Configures all HTTP routes for the API.

use std::time::Duration;

use axum::{
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
    Router,
};
use tower_http::timeout::TimeoutLayer;

use super::handlers;
use crate::infrastructure::metrics;
use crate::presentation::middleware::{identity_middleware, metrics::track_metrics};
use crate::presentation::websocket::ws_handler;
use crate::startup::AppState;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.settings.server.request_timeout_secs);

    Router::new()
        .nest("/api/v1", api_routes(state.clone(), timeout))
        // Gateway connections resolve identity from their own init payload
        .route("/gateway", get(ws_handler))
        // Health check endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/health/live", get(handlers::health::liveness))
        .route("/health/ready", get(handlers::health::readiness))
        // Prometheus metrics endpoint
        .route("/metrics", get(metrics_handler))
        .route_layer(middleware::from_fn(track_metrics))
        .with_state(state)
}

/// Prometheus metrics endpoint handler
async fn metrics_handler() -> impl IntoResponse {
    let metrics = metrics::gather_metrics();
    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        metrics,
    )
}

/// API v1 routes. Every request gets its identity resolved once, up front.
fn api_routes(state: AppState, timeout: Duration) -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/users", user_routes())
        .nest("/messages", message_routes())
        .layer(middleware::from_fn_with_state(state, identity_middleware))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
}

/// Authentication routes
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/logout", post(handlers::auth::logout))
}

/// User and follow graph routes
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::user::list_users))
        .route("/@me", get(handlers::user::get_current_user))
        .route("/@me/followers", get(handlers::user::get_my_followers))
        .route("/@me/following", get(handlers::user::get_my_following))
        .route(
            "/@me/following/{username}",
            put(handlers::user::follow_user).delete(handlers::user::unfollow_user),
        )
        .route("/{username}/followers", get(handlers::user::get_user_followers))
        .route("/{username}/following", get(handlers::user::get_user_following))
}

/// Message routes
fn message_routes() -> Router<AppState> {
    Router::new().route(
        "/",
        post(handlers::message::create_message).get(handlers::message::list_messages),
    )
}
