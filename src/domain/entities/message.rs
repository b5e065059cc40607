//! Message entity and repository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// Maximum message body length in characters.
pub const MAX_MESSAGE_LENGTH: usize = 2000;

/// A message posted by a user.
///
/// Maps to the `messages` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub body: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(user_id: Uuid, body: String) -> Self {
        Self {
            id: Uuid::now_v7(),
            body,
            user_id,
            created_at: Utc::now(),
        }
    }
}

/// Repository trait for Message data access operations.
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Store a new message.
    async fn create(&self, message: &Message) -> Result<Message, AppError>;

    /// List all messages, oldest first.
    async fn list_all(&self) -> Result<Vec<Message>, AppError>;
}
