//! Authentication Service
//!
//! Handles registration and login. Login failures never reveal whether the
//! identifier or the password was wrong.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{normalize, validate_username, User, UserRepository};
use crate::shared::error::AppError;

use super::credential_service::{CredentialError, CredentialService};
use super::token_service::{SessionClaims, TokenError, TokenService};

/// Authentication service trait for dependency injection
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new user
    async fn register(&self, username: &str, email: &str, password: &str) -> Result<User, AuthError>;

    /// Authenticate with a username or email and a password
    async fn login(&self, username_or_email: &str, password: &str) -> Result<LoginOutcome, AuthError>;
}

/// Successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    pub token: String,
}

/// Authentication errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    InvalidUsername(&'static str),

    #[error("Email already exists")]
    EmailTaken,

    #[error("Username already exists")]
    UsernameTaken,

    #[error("{0}")]
    Conflict(String),

    #[error("Error signing token")]
    Signing,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials => AppError::Unauthorized("Invalid credentials".into()),
            AuthError::InvalidUsername(msg) => AppError::Validation(format!("username: {msg}")),
            AuthError::EmailTaken => AppError::Conflict("Email already exists".into()),
            AuthError::UsernameTaken => AppError::Conflict("Username already exists".into()),
            AuthError::Conflict(msg) => AppError::Conflict(msg),
            e => AppError::Internal(e.to_string()),
        }
    }
}

/// AuthService implementation
pub struct AuthServiceImpl<U>
where
    U: UserRepository + ?Sized,
{
    user_repo: Arc<U>,
    credentials: CredentialService,
    tokens: Arc<TokenService>,
}

impl<U> AuthServiceImpl<U>
where
    U: UserRepository + ?Sized,
{
    pub fn new(user_repo: Arc<U>, credentials: CredentialService, tokens: Arc<TokenService>) -> Self {
        Self {
            user_repo,
            credentials,
            tokens,
        }
    }
}

#[async_trait]
impl<U> AuthService for AuthServiceImpl<U>
where
    U: UserRepository + ?Sized + 'static,
{
    async fn register(&self, username: &str, email: &str, password: &str) -> Result<User, AuthError> {
        let username = normalize(username);
        let email = normalize(email);
        validate_username(&username).map_err(AuthError::InvalidUsername)?;

        if self
            .user_repo
            .email_exists(&email)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
        {
            return Err(AuthError::EmailTaken);
        }

        if self
            .user_repo
            .username_exists(&username)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
        {
            return Err(AuthError::UsernameTaken);
        }

        let password_hash = self
            .credentials
            .hash(password)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let user = User::new(&username, &email, password_hash);

        let created = self.user_repo.create(&user).await.map_err(|e| match e {
            AppError::Conflict(msg) => AuthError::Conflict(msg),
            e => AuthError::Internal(e.to_string()),
        })?;

        tracing::info!(user_id = %created.id, username = %created.username, "User registered");
        Ok(created)
    }

    async fn login(&self, username_or_email: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let identifier = self.credentials.normalize_identifier(username_or_email);

        let user = self
            .user_repo
            .find_by_username_or_email(&identifier)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .ok_or(AuthError::InvalidCredentials)?;

        let valid = match self.credentials.verify(&user.password_hash, password) {
            Ok(valid) => valid,
            Err(CredentialError::MalformedHash(e)) => {
                tracing::error!(user_id = %user.id, error = %e, "Stored password hash is malformed");
                false
            }
            Err(e) => return Err(AuthError::Internal(e.to_string())),
        };

        if !valid {
            return Err(AuthError::InvalidCredentials);
        }

        let token = self
            .tokens
            .issue(&SessionClaims::from(&user))
            .map_err(|e| match e {
                TokenError::Signing(msg) => {
                    tracing::error!(error = %msg, "Token signing failed");
                    AuthError::Signing
                }
                TokenError::InvalidToken => AuthError::Signing,
            })?;

        tracing::info!(user_id = %user.id, "User logged in");
        Ok(LoginOutcome { user, token })
    }
}
