//! WebSocket Gateway
//!
//! Connection registry and the wire form of dispatched events.

use dashmap::DashMap;
use serde::Serialize;
use uuid::Uuid;

use crate::application::dto::response::MessageResponse;
use crate::application::events::{DomainEvent, UserSummary};
use crate::infrastructure::metrics;

/// Dispatch events as sent to clients
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum GatewayEvent {
    MessageCreate(MessageCreateEvent),
    FollowAdd(FollowEvent),
    FollowRemove(FollowEvent),
}

impl GatewayEvent {
    /// Get the event name for dispatch
    pub fn event_name(&self) -> &'static str {
        match self {
            GatewayEvent::MessageCreate(_) => "MESSAGE_CREATE",
            GatewayEvent::FollowAdd(_) => "FOLLOW_ADD",
            GatewayEvent::FollowRemove(_) => "FOLLOW_REMOVE",
        }
    }

    /// Convert to JSON value for sending
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

impl From<DomainEvent> for GatewayEvent {
    fn from(event: DomainEvent) -> Self {
        match event {
            DomainEvent::MessageCreated { message, author } => {
                GatewayEvent::MessageCreate(MessageCreateEvent {
                    message: message.into(),
                    author,
                })
            }
            DomainEvent::FollowAdded { follower, followee } => {
                GatewayEvent::FollowAdd(FollowEvent { follower, followee })
            }
            DomainEvent::FollowRemoved { follower, followee } => {
                GatewayEvent::FollowRemove(FollowEvent { follower, followee })
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageCreateEvent {
    #[serde(flatten)]
    pub message: MessageResponse,
    pub author: UserSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct FollowEvent {
    pub follower: UserSummary,
    pub followee: UserSummary,
}

/// A live connection. `user_id` is `None` for anonymous connections.
#[derive(Debug, Clone)]
pub struct ConnectedSession {
    pub session_id: String,
    pub user_id: Option<Uuid>,
}

/// Registry of open gateway connections
pub struct Gateway {
    sessions: DashMap<String, ConnectedSession>,
    user_sessions: DashMap<Uuid, Vec<String>>,
    heartbeat_interval_ms: u64,
}

impl Gateway {
    pub fn new(heartbeat_interval_ms: u64) -> Self {
        Self {
            sessions: DashMap::new(),
            user_sessions: DashMap::new(),
            heartbeat_interval_ms,
        }
    }

    /// Get the heartbeat interval
    pub fn heartbeat_interval(&self) -> u64 {
        self.heartbeat_interval_ms
    }

    /// Register a new connected session
    pub fn register_session(&self, session_id: String, user_id: Option<Uuid>) {
        self.sessions.insert(
            session_id.clone(),
            ConnectedSession {
                session_id: session_id.clone(),
                user_id,
            },
        );

        if let Some(user_id) = user_id {
            self.user_sessions
                .entry(user_id)
                .or_default()
                .push(session_id.clone());
        }

        self.update_metrics();
        tracing::info!(user_id = ?user_id, session_id = %session_id, "Session registered");
    }

    /// Unregister a session
    pub fn unregister_session(&self, session_id: &str) {
        if let Some((_, session)) = self.sessions.remove(session_id) {
            if let Some(user_id) = session.user_id {
                let now_empty = match self.user_sessions.get_mut(&user_id) {
                    Some(mut sessions) => {
                        sessions.retain(|s| s != session_id);
                        sessions.is_empty()
                    }
                    None => false,
                };
                if now_empty {
                    self.user_sessions.remove_if(&user_id, |_, s| s.is_empty());
                }
            }

            self.update_metrics();
            tracing::info!(
                user_id = ?session.user_id,
                session_id = %session_id,
                "Session unregistered"
            );
        }
    }

    /// Get session count
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Sessions opened with a valid identity
    pub fn identified_count(&self) -> usize {
        self.sessions.iter().filter(|s| s.user_id.is_some()).count()
    }

    /// Check if user is online (has at least one session)
    pub fn is_user_online(&self, user_id: Uuid) -> bool {
        self.user_sessions
            .get(&user_id)
            .map(|sessions| !sessions.is_empty())
            .unwrap_or(false)
    }

    fn update_metrics(&self) {
        metrics::set_gateway_connections(self.session_count(), self.identified_count());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Message;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_register_and_unregister() {
        let gateway = Gateway::new(45_000);
        let user_id = Uuid::new_v4();

        gateway.register_session("a".into(), Some(user_id));
        gateway.register_session("b".into(), None);
        assert_eq!(gateway.session_count(), 2);
        assert_eq!(gateway.identified_count(), 1);
        assert!(gateway.is_user_online(user_id));

        gateway.unregister_session("a");
        assert_eq!(gateway.session_count(), 1);
        assert!(!gateway.is_user_online(user_id));
    }

    #[test]
    fn test_event_names_and_payload() {
        let author = UserSummary {
            id: Uuid::new_v4(),
            username: "alice".into(),
        };
        let message = Message::new(author.id, "hello".into());
        let event = GatewayEvent::from(DomainEvent::MessageCreated {
            message,
            author,
        });

        assert_eq!(event.event_name(), "MESSAGE_CREATE");
        let json = event.to_json();
        assert_eq!(json["body"], "hello");
        assert_eq!(json["author"]["username"], "alice");
    }
}
