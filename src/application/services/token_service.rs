//! Token Service
//!
//! Issues and verifies HS256 session tokens carrying `{id, username, email}`.
//! The same tokens are accepted from the cookie, the bearer header, and the
//! gateway connection-init payload.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::JwtSettings;
use crate::domain::{CurrentUser, User};

/// Identity claims embedded in a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

impl From<&User> for SessionClaims {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

impl From<SessionClaims> for CurrentUser {
    fn from(claims: SessionClaims) -> Self {
        Self {
            id: claims.id,
            username: claims.username,
            email: claims.email,
        }
    }
}

/// Wire format of the JWT payload
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    #[serde(flatten)]
    session: SessionClaims,
    /// Issued at time (Unix timestamp)
    iat: i64,
    /// Expiration time (Unix timestamp)
    exp: i64,
}

/// Token errors
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Token signing failed: {0}")]
    Signing(String),

    #[error("Invalid token")]
    InvalidToken,
}

/// HMAC session token issuer/verifier.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: Option<EncodingKey>,
    decoding_key: DecodingKey,
    validation: Validation,
    expiry: Duration,
}

impl TokenService {
    pub fn new(settings: &JwtSettings) -> Self {
        let secret = settings.secret.as_bytes();
        let encoding_key = (!secret.is_empty()).then(|| EncodingKey::from_secret(secret));

        Self {
            encoding_key,
            decoding_key: DecodingKey::from_secret(secret),
            validation: Validation::default(),
            expiry: Duration::minutes(settings.token_expiry_minutes),
        }
    }

    /// Sign a token for the given claims.
    pub fn issue(&self, claims: &SessionClaims) -> Result<String, TokenError> {
        let key = self
            .encoding_key
            .as_ref()
            .ok_or_else(|| TokenError::Signing("signing key unavailable".into()))?;

        let now = Utc::now();
        let payload = Claims {
            session: claims.clone(),
            iat: now.timestamp(),
            exp: (now + self.expiry).timestamp(),
        };

        encode(&Header::default(), &payload, key).map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Check the signature and expiry, returning the identity claims.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, TokenError> {
        if self.encoding_key.is_none() {
            return Err(TokenError::InvalidToken);
        }

        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims.session)
            .map_err(|e| {
                tracing::trace!(error = %e, "Token rejected");
                TokenError::InvalidToken
            })
    }
}
