//! Response DTOs
//!
//! Data structures for API response bodies, shared by the HTTP handlers and
//! the gateway.

use serde::Serialize;

use crate::domain::{CurrentUser, FollowList, Message, User};

/// User response. The password hash is never part of any output.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub created_at: String,
}

impl UserResponse {
    pub fn from_user(user: User, include_email: bool) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username,
            email: if include_email { Some(user.email) } else { None },
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// The caller's resolved identity
#[derive(Debug, Serialize)]
pub struct CurrentUserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
}

impl From<CurrentUser> for CurrentUserResponse {
    fn from(user: CurrentUser) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username,
            email: user.email,
        }
    }
}

/// Follower/following view
#[derive(Debug, Serialize)]
pub struct FollowListResponse {
    pub count: usize,
    pub items: Vec<UserResponse>,
}

impl From<FollowList> for FollowListResponse {
    fn from(list: FollowList) -> Self {
        let items: Vec<UserResponse> = list
            .into_items()
            .into_iter()
            .map(|u| UserResponse::from_user(u, false))
            .collect();
        Self {
            count: items.len(),
            items,
        }
    }
}

/// Login response. The same token is also set as the session cookie.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Message response
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub id: String,
    pub body: String,
    pub user_id: String,
    pub created_at: String,
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self {
            id: message.id.to_string(),
            body: message.body,
            user_id: message.user_id.to_string(),
            created_at: message.created_at.to_rfc3339(),
        }
    }
}
