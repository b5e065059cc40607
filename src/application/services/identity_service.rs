//! Identity Resolver
//!
//! Turns a transport-specific credential carrier into the uniform
//! `Option<CurrentUser>` used by every handler. Resolution never fails: any
//! missing, malformed, expired or forged token degrades to anonymous.

use std::sync::Arc;

use crate::domain::CurrentUser;

use super::token_service::TokenService;

/// Where a credential was found, per transport.
#[derive(Debug, Clone, Copy)]
pub enum CredentialSource<'a> {
    /// Request channel: the session cookie, re-sent with every call, with the
    /// `Authorization` header as a fallback. A valid cookie wins over the
    /// header; a cookie that fails verification does not hide a valid header.
    Request {
        cookie: Option<&'a str>,
        authorization: Option<&'a str>,
    },
    /// Subscription channel: the `Authorization` field of the connection-init
    /// payload, supplied once at handshake.
    Subscription { authorization: Option<&'a str> },
}

impl CredentialSource<'_> {
    fn channel(&self) -> &'static str {
        match self {
            CredentialSource::Request { .. } => "request",
            CredentialSource::Subscription { .. } => "subscription",
        }
    }

    /// Tokens to try, in order of precedence.
    fn candidates(&self) -> [Option<&str>; 2] {
        match *self {
            CredentialSource::Request {
                cookie,
                authorization,
            } => [non_empty(cookie), authorization.and_then(strip_bearer)],
            CredentialSource::Subscription { authorization } => {
                [authorization.and_then(strip_bearer), None]
            }
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Accepts both `Bearer <token>` and a bare token.
fn strip_bearer(value: &str) -> Option<&str> {
    let value = value.trim();
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .unwrap_or(value)
        .trim();
    (!token.is_empty()).then_some(token)
}

/// Resolves the caller's identity from either transport.
#[derive(Clone)]
pub struct IdentityResolver {
    tokens: Arc<TokenService>,
}

impl IdentityResolver {
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }

    pub fn resolve(&self, source: CredentialSource<'_>) -> Option<CurrentUser> {
        source
            .candidates()
            .into_iter()
            .flatten()
            .find_map(|token| match self.tokens.verify(token) {
                Ok(claims) => Some(claims.into()),
                Err(e) => {
                    tracing::debug!(channel = source.channel(), error = %e, "Credential rejected");
                    None
                }
            })
    }
}
