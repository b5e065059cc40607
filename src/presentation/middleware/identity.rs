//! Identity Middleware
//!
//! Resolves the caller on the request channel once per request. The result
//! is stored as a request extension; handlers decide whether anonymity is
//! acceptable through the `AuthUser` / `MaybeUser` extractors.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;

use crate::application::services::CredentialSource;
use crate::domain::CurrentUser;
use crate::startup::AppState;

/// Identity resolved for the current request. `None` means anonymous.
#[derive(Debug, Clone, Default)]
pub struct ResolvedIdentity(pub Option<CurrentUser>);

/// Read the session cookie (falling back to the `Authorization` header) and
/// attach the resolved identity. Never rejects the request.
pub async fn identity_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let identity = {
        let jar = CookieJar::from_headers(request.headers());
        let cookie = jar.get(&state.settings.session.cookie_name);
        let authorization = request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        state.identity.resolve(CredentialSource::Request {
            cookie: cookie.map(|c| c.value()),
            authorization,
        })
    };

    if let Some(user) = &identity {
        tracing::trace!(user_id = %user.id, "Request identity resolved");
    }

    request.extensions_mut().insert(ResolvedIdentity(identity));
    next.run(request).await
}
