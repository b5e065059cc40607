//! In-memory repositories
//!
//! Used when no database URL is configured, and by the test suite. All state
//! sits behind one `RwLock`, so an edge insert or removal is atomic with
//! respect to every reader.

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::domain::{Message, MessageRepository, User, UserRepository};
use crate::shared::error::AppError;

#[derive(Debug, Default)]
struct GraphState {
    /// Insertion ordered
    users: Vec<User>,
    /// `(follower_id, followee_id)`, insertion ordered
    edges: Vec<(Uuid, Uuid)>,
}

impl GraphState {
    fn user(&self, id: Uuid) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    fn collect(&self, ids: impl Iterator<Item = Uuid>) -> Vec<User> {
        ids.filter_map(|id| self.user(id).cloned()).collect()
    }
}

/// In-memory user and follow-edge store.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    state: RwLock<GraphState>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.state.read().user(id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let state = self.state.read();
        Ok(state.users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_username_or_email(&self, identifier: &str) -> Result<Option<User>, AppError> {
        let state = self.state.read();
        Ok(state
            .users
            .iter()
            .find(|u| u.username == identifier || u.email == identifier)
            .cloned())
    }

    async fn create(&self, user: &User) -> Result<User, AppError> {
        let mut state = self.state.write();
        if state
            .users
            .iter()
            .any(|u| u.id == user.id || u.username == user.username || u.email == user.email)
        {
            return Err(AppError::Conflict(
                "User with this email or username already exists".to_string(),
            ));
        }
        state.users.push(user.clone());
        Ok(user.clone())
    }

    async fn email_exists(&self, email: &str) -> Result<bool, AppError> {
        Ok(self.state.read().users.iter().any(|u| u.email == email))
    }

    async fn username_exists(&self, username: &str) -> Result<bool, AppError> {
        Ok(self.state.read().users.iter().any(|u| u.username == username))
    }

    async fn list_all(&self) -> Result<Vec<User>, AppError> {
        Ok(self.state.read().users.clone())
    }

    async fn follow(&self, follower_id: Uuid, followee_id: Uuid) -> Result<bool, AppError> {
        let mut state = self.state.write();
        if state.user(follower_id).is_none() || state.user(followee_id).is_none() {
            return Err(AppError::NotFound("User not found".into()));
        }
        let edge = (follower_id, followee_id);
        if state.edges.contains(&edge) {
            return Ok(false);
        }
        state.edges.push(edge);
        Ok(true)
    }

    async fn unfollow(&self, follower_id: Uuid, followee_id: Uuid) -> Result<bool, AppError> {
        let mut state = self.state.write();
        let before = state.edges.len();
        state
            .edges
            .retain(|&(from, to)| !(from == follower_id && to == followee_id));
        Ok(state.edges.len() != before)
    }

    async fn find_following(&self, user_id: Uuid) -> Result<Vec<User>, AppError> {
        let state = self.state.read();
        let ids = state
            .edges
            .iter()
            .filter(|(from, _)| *from == user_id)
            .map(|&(_, to)| to);
        Ok(state.collect(ids))
    }

    async fn find_followed_by(&self, user_id: Uuid) -> Result<Vec<User>, AppError> {
        let state = self.state.read();
        let ids = state
            .edges
            .iter()
            .filter(|(_, to)| *to == user_id)
            .map(|&(from, _)| from);
        Ok(state.collect(ids))
    }
}

/// In-memory message store.
#[derive(Debug, Default)]
pub struct InMemoryMessageRepository {
    messages: RwLock<Vec<Message>>,
}

impl InMemoryMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn create(&self, message: &Message) -> Result<Message, AppError> {
        self.messages.write().push(message.clone());
        Ok(message.clone())
    }

    async fn list_all(&self) -> Result<Vec<Message>, AppError> {
        Ok(self.messages.read().clone())
    }
}
