//! WebSocket Session Management

use std::time::Instant;

use uuid::Uuid;

use crate::application::events::DomainEvent;
use crate::domain::CurrentUser;

/// Per-connection state. The identity is fixed when the session is built
/// from the connection-init payload and never changes afterwards.
#[derive(Debug)]
pub struct SessionState {
    pub session_id: String,
    current_user: Option<CurrentUser>,
    sequence: u64,
    last_heartbeat: Instant,
}

impl SessionState {
    pub fn new(session_id: String, current_user: Option<CurrentUser>) -> Self {
        Self {
            session_id,
            current_user,
            sequence: 0,
            last_heartbeat: Instant::now(),
        }
    }

    pub fn current_user(&self) -> Option<&CurrentUser> {
        self.current_user.as_ref()
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.current_user.as_ref().map(|u| u.id)
    }

    pub fn next_sequence(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }

    pub fn heartbeat(&mut self) {
        self.last_heartbeat = Instant::now();
    }

    pub fn is_alive(&self, timeout_ms: u64) -> bool {
        self.last_heartbeat.elapsed().as_millis() < timeout_ms as u128
    }

    /// Whether this connection should see the event.
    pub fn wants(&self, event: &DomainEvent) -> bool {
        match event.recipient() {
            None => true,
            Some(recipient) => self.user_id() == Some(recipient),
        }
    }
}
