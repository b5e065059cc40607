//! User entity, follow views, and repository trait.
//!
//! Maps to the `users` and `follows` tables in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// Represents a user account in the social graph.
///
/// Maps to the `users` table:
/// - id: UUID PRIMARY KEY (v7, assigned at creation)
/// - username: VARCHAR(32) NOT NULL UNIQUE (stored lowercase)
/// - email: VARCHAR(255) NOT NULL UNIQUE (stored lowercase)
/// - password_hash: VARCHAR(255) NOT NULL
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
///
/// `following` / `followed_by` are not stored on the row. Both are views over
/// the single `follows(follower_id, followee_id)` edge table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Immutable identifier
    pub id: Uuid,

    /// Username (2-32 characters, unique, lowercase)
    pub username: String,

    /// Email address (unique, lowercase)
    pub email: String,

    /// Argon2 password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Build a new account with normalized identifiers and a fresh id.
    pub fn new(username: &str, email: &str, password_hash: String) -> Self {
        Self {
            id: Uuid::now_v7(),
            username: normalize(username),
            email: normalize(email),
            password_hash,
            created_at: Utc::now(),
        }
    }

    /// Password-free projection used as the resolved identity.
    pub fn to_current_user(&self) -> CurrentUser {
        CurrentUser {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }
}

/// Lowercase form used for every username/email comparison and for storage.
pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

pub const USERNAME_MIN_LENGTH: usize = 2;
pub const USERNAME_MAX_LENGTH: usize = 32;

/// Check a normalized username.
///
/// Usernames appear as URL path segments, so they are limited to `a-z`,
/// `0-9`, `_`, `.` and `-`, and must start with a letter or digit.
pub fn validate_username(username: &str) -> Result<(), &'static str> {
    let length = username.chars().count();
    if !(USERNAME_MIN_LENGTH..=USERNAME_MAX_LENGTH).contains(&length) {
        return Err("Username must be 2-32 characters");
    }

    let mut chars = username.chars();
    if !chars.next().is_some_and(|c| c.is_ascii_lowercase() || c.is_ascii_digit()) {
        return Err("Username must start with a letter or digit");
    }
    if !chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '.' | '-')) {
        return Err("Username may only contain letters, digits, '_', '.' and '-'");
    }
    Ok(())
}

/// Identity resolved for one request or one subscription connection.
///
/// Never persisted and never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

/// A follower/following view. `count` always equals `items.len()`.
#[derive(Debug, Clone)]
pub struct FollowList {
    count: usize,
    items: Vec<User>,
}

impl FollowList {
    pub fn new(items: Vec<User>) -> Self {
        Self {
            count: items.len(),
            items,
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn items(&self) -> &[User] {
        &self.items
    }

    pub fn into_items(self) -> Vec<User> {
        self.items
    }

    /// Whether a user with the given id is part of this view.
    pub fn contains(&self, user_id: Uuid) -> bool {
        self.items.iter().any(|u| u.id == user_id)
    }
}

/// Repository trait for user and follow-edge data access.
///
/// Implementations must apply `follow` / `unfollow` as a single atomic
/// operation on the edge set: after the call either both the follower's
/// `following` view and the followee's `followed_by` view reflect the change,
/// or neither does.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    /// Find a user by (already normalized) username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// Find a user whose username OR email equals the (normalized) identifier.
    async fn find_by_username_or_email(&self, identifier: &str) -> Result<Option<User>, AppError>;

    /// Create a new user. Unique violations map to `AppError::Conflict`.
    async fn create(&self, user: &User) -> Result<User, AppError>;

    /// Check if an email address is already registered.
    async fn email_exists(&self, email: &str) -> Result<bool, AppError>;

    /// Check if a username is already taken.
    async fn username_exists(&self, username: &str) -> Result<bool, AppError>;

    /// List every user, oldest first.
    async fn list_all(&self) -> Result<Vec<User>, AppError>;

    /// Insert the edge `follower -> followee`. Returns `false` if it already existed.
    async fn follow(&self, follower_id: Uuid, followee_id: Uuid) -> Result<bool, AppError>;

    /// Remove the edge `follower -> followee`. Returns `false` if it was absent.
    async fn unfollow(&self, follower_id: Uuid, followee_id: Uuid) -> Result<bool, AppError>;

    /// Users that `user_id` follows.
    async fn find_following(&self, user_id: Uuid) -> Result<Vec<User>, AppError>;

    /// Users following `user_id`.
    async fn find_followed_by(&self, user_id: Uuid) -> Result<Vec<User>, AppError>;
}
