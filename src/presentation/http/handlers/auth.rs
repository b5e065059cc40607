//! Authentication Handlers

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use validator::Validate;

use crate::application::dto::request::{LoginRequest, RegisterRequest};
use crate::application::dto::response::{TokenResponse, UserResponse};
use crate::config::SessionSettings;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

/// Register a new user
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    body.validate().map_err(validation_error)?;

    let user = state
        .auth
        .register(&body.username, &body.email, &body.password)
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from_user(user, true))))
}

/// Login with a username or email. The token is returned in the body and set
/// as the session cookie.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<(CookieJar, Json<TokenResponse>), AppError> {
    body.validate().map_err(validation_error)?;

    let outcome = state
        .auth
        .login(&body.username_or_email, &body.password)
        .await?;

    let jar = jar.add(session_cookie(&state.settings.session, outcome.token.clone()));
    Ok((jar, Json(TokenResponse {
        token: outcome.token,
    })))
}

/// Clear the session cookie. Tokens are stateless, so nothing is revoked.
///
/// The removal cookie must carry the same path and domain as the one set at
/// login or browsers keep the original.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, StatusCode) {
    let removal = session_cookie(&state.settings.session, String::new());
    (jar.remove(removal), StatusCode::NO_CONTENT)
}

fn session_cookie(settings: &SessionSettings, token: String) -> Cookie<'static> {
    let mut cookie = Cookie::build((settings.cookie_name.clone(), token))
        .path("/")
        .http_only(true)
        .secure(settings.cookie_secure)
        .same_site(SameSite::Lax);
    if let Some(domain) = &settings.cookie_domain {
        cookie = cookie.domain(domain.clone());
    }
    cookie.build()
}
