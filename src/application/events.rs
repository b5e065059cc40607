//! Application Events
//!
//! In-process fan-out of graph and message changes. Services publish; each
//! gateway connection subscribes and forwards what concerns it.

use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::domain::{Message, User};

/// Public part of a user carried in events
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
        }
    }
}

/// Something that happened which subscription connections may care about.
#[derive(Debug, Clone)]
pub enum DomainEvent {
    /// `follower` started following `followee`
    FollowAdded { follower: UserSummary, followee: UserSummary },
    /// `follower` stopped following `followee`
    FollowRemoved { follower: UserSummary, followee: UserSummary },
    /// A message was posted
    MessageCreated { message: Message, author: UserSummary },
}

impl DomainEvent {
    /// Users this event is addressed to. `None` means everyone.
    pub fn recipient(&self) -> Option<Uuid> {
        match self {
            DomainEvent::FollowAdded { followee, .. } | DomainEvent::FollowRemoved { followee, .. } => {
                Some(followee.id)
            }
            DomainEvent::MessageCreated { .. } => None,
        }
    }
}

/// Broadcast bus shared by services and the gateway.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an event. Having no subscribers is not an error.
    pub fn publish(&self, event: DomainEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}
