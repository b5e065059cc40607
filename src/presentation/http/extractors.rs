//! Custom Extractors
//!
//! Axum extractors over the identity attached by `identity_middleware`.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::domain::{require_user, CurrentUser};
use crate::presentation::middleware::ResolvedIdentity;
use crate::shared::error::AppError;

/// Caller that must be signed in. Rejects with 401 when anonymous.
#[derive(Debug, Clone)]
pub struct AuthUser(pub CurrentUser);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        require_user(resolved(parts))
            .map(AuthUser)
            .map_err(|e| AppError::Unauthorized(e.to_string()))
    }
}

/// Caller that may be anonymous.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(resolved(parts)))
    }
}

fn resolved(parts: &Parts) -> Option<CurrentUser> {
    parts
        .extensions
        .get::<ResolvedIdentity>()
        .and_then(|identity| identity.0.clone())
}
