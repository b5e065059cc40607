//! Message Service
//!
//! Posting and listing messages. New messages are pushed to gateway
//! subscribers through the event bus.

use std::sync::Arc;

use async_trait::async_trait;

use crate::application::events::{DomainEvent, EventBus, UserSummary};
use crate::domain::{CurrentUser, Message, MessageRepository, MAX_MESSAGE_LENGTH};
use crate::shared::error::AppError;

/// Message service trait
#[async_trait]
pub trait MessageService: Send + Sync {
    /// Post a message as the given user
    async fn create_message(&self, author: &CurrentUser, body: &str) -> Result<Message, MessageError>;

    /// List every message, oldest first
    async fn list_messages(&self) -> Result<Vec<Message>, MessageError>;
}

/// Message service errors
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    #[error("Message body must be 1-2000 characters")]
    InvalidBody,

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<MessageError> for AppError {
    fn from(e: MessageError) -> Self {
        match e {
            MessageError::InvalidBody => AppError::Validation(e.to_string()),
            MessageError::Storage(msg) => AppError::Internal(msg),
        }
    }
}

/// MessageService implementation
pub struct MessageServiceImpl<M>
where
    M: MessageRepository + ?Sized,
{
    message_repo: Arc<M>,
    events: EventBus,
}

impl<M> MessageServiceImpl<M>
where
    M: MessageRepository + ?Sized,
{
    pub fn new(message_repo: Arc<M>, events: EventBus) -> Self {
        Self {
            message_repo,
            events,
        }
    }
}

#[async_trait]
impl<M> MessageService for MessageServiceImpl<M>
where
    M: MessageRepository + ?Sized + 'static,
{
    async fn create_message(&self, author: &CurrentUser, body: &str) -> Result<Message, MessageError> {
        let body = body.trim();
        let length = body.chars().count();
        if length == 0 || length > MAX_MESSAGE_LENGTH {
            return Err(MessageError::InvalidBody);
        }

        let message = self
            .message_repo
            .create(&Message::new(author.id, body.to_string()))
            .await
            .map_err(|e| MessageError::Storage(e.to_string()))?;

        tracing::debug!(user_id = %author.id, message_id = %message.id, "Message created");
        self.events.publish(DomainEvent::MessageCreated {
            message: message.clone(),
            author: UserSummary {
                id: author.id,
                username: author.username.clone(),
            },
        });

        Ok(message)
    }

    async fn list_messages(&self) -> Result<Vec<Message>, MessageError> {
        self.message_repo
            .list_all()
            .await
            .map_err(|e| MessageError::Storage(e.to_string()))
    }
}
