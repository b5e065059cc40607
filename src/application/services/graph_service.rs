//! Social Graph Service
//!
//! Follow/unfollow mutations and follower/following views. The edge update
//! itself is delegated to `UserRepository::follow` / `unfollow`, which apply
//! both sides of the relation in one atomic step.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::application::events::{DomainEvent, EventBus, UserSummary};
use crate::domain::{normalize, FollowList, User, UserRepository};
use crate::infrastructure::metrics;
use crate::shared::error::AppError;

/// Social graph service trait
#[async_trait]
pub trait GraphService: Send + Sync {
    /// Make `actor_id` follow the user named `target_username`. Idempotent.
    async fn follow(&self, actor_id: Uuid, target_username: &str) -> Result<User, GraphError>;

    /// Make `actor_id` stop following `target_username`. Idempotent.
    async fn unfollow(&self, actor_id: Uuid, target_username: &str) -> Result<User, GraphError>;

    /// Users following `user_id`
    async fn followers_of(&self, user_id: Uuid) -> Result<FollowList, GraphError>;

    /// Users `user_id` follows
    async fn following_of(&self, user_id: Uuid) -> Result<FollowList, GraphError>;

    /// Followers of the user with the given username
    async fn followers_of_username(&self, username: &str) -> Result<FollowList, GraphError>;

    /// Followees of the user with the given username
    async fn following_of_username(&self, username: &str) -> Result<FollowList, GraphError>;

    /// Snapshot of every user. Not paginated.
    async fn list_all(&self) -> Result<Vec<User>, GraphError>;
}

/// Social graph errors
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Target user not found")]
    TargetNotFound,

    #[error("User not found")]
    UserNotFound,

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<AppError> for GraphError {
    fn from(e: AppError) -> Self {
        GraphError::Storage(e.to_string())
    }
}

impl From<GraphError> for AppError {
    fn from(e: GraphError) -> Self {
        match e {
            GraphError::TargetNotFound => AppError::NotFound("Target user not found".into()),
            GraphError::UserNotFound => AppError::NotFound("User not found".into()),
            GraphError::Storage(msg) => AppError::Internal(msg),
        }
    }
}

/// GraphService implementation
pub struct GraphServiceImpl<U>
where
    U: UserRepository + ?Sized,
{
    user_repo: Arc<U>,
    events: EventBus,
}

impl<U> GraphServiceImpl<U>
where
    U: UserRepository + ?Sized,
{
    pub fn new(user_repo: Arc<U>, events: EventBus) -> Self {
        Self { user_repo, events }
    }

    async fn resolve_target(&self, username: &str) -> Result<User, GraphError> {
        self.user_repo
            .find_by_username(&normalize(username))
            .await?
            .ok_or(GraphError::TargetNotFound)
    }

    async fn resolve_actor(&self, actor_id: Uuid) -> Result<User, GraphError> {
        self.user_repo
            .find_by_id(actor_id)
            .await?
            .ok_or(GraphError::UserNotFound)
    }

    async fn resolve_username(&self, username: &str) -> Result<User, GraphError> {
        self.user_repo
            .find_by_username(&normalize(username))
            .await?
            .ok_or(GraphError::UserNotFound)
    }
}

#[async_trait]
impl<U> GraphService for GraphServiceImpl<U>
where
    U: UserRepository + ?Sized + 'static,
{
    async fn follow(&self, actor_id: Uuid, target_username: &str) -> Result<User, GraphError> {
        let target = self.resolve_target(target_username).await?;
        let actor = self.resolve_actor(actor_id).await?;

        let changed = self.user_repo.follow(actor.id, target.id).await?;
        metrics::record_follow_mutation("follow", changed);

        if changed {
            tracing::info!(user_id = %actor.id, target = %target.username, "Follow edge created");
            self.events.publish(DomainEvent::FollowAdded {
                follower: UserSummary::from(&actor),
                followee: UserSummary::from(&target),
            });
        }

        Ok(actor)
    }

    async fn unfollow(&self, actor_id: Uuid, target_username: &str) -> Result<User, GraphError> {
        let target = self.resolve_target(target_username).await?;
        let actor = self.resolve_actor(actor_id).await?;

        let changed = self.user_repo.unfollow(actor.id, target.id).await?;
        metrics::record_follow_mutation("unfollow", changed);

        if changed {
            tracing::info!(user_id = %actor.id, target = %target.username, "Follow edge removed");
            self.events.publish(DomainEvent::FollowRemoved {
                follower: UserSummary::from(&actor),
                followee: UserSummary::from(&target),
            });
        }

        Ok(actor)
    }

    async fn followers_of(&self, user_id: Uuid) -> Result<FollowList, GraphError> {
        let items = self.user_repo.find_followed_by(user_id).await?;
        Ok(FollowList::new(items))
    }

    async fn following_of(&self, user_id: Uuid) -> Result<FollowList, GraphError> {
        let items = self.user_repo.find_following(user_id).await?;
        Ok(FollowList::new(items))
    }

    async fn followers_of_username(&self, username: &str) -> Result<FollowList, GraphError> {
        let user = self.resolve_username(username).await?;
        self.followers_of(user.id).await
    }

    async fn following_of_username(&self, username: &str) -> Result<FollowList, GraphError> {
        let user = self.resolve_username(username).await?;
        self.following_of(user.id).await
    }

    async fn list_all(&self) -> Result<Vec<User>, GraphError> {
        Ok(self.user_repo.list_all().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MockUserRepository;
    use crate::infrastructure::repositories::InMemoryUserRepository;
    use pretty_assertions::assert_eq;

    async fn seeded() -> (GraphServiceImpl<InMemoryUserRepository>, User, User) {
        let repo = Arc::new(InMemoryUserRepository::new());
        let alice = repo
            .create(&User::new("alice", "a@x.com", "h".into()))
            .await
            .unwrap();
        let bob = repo
            .create(&User::new("bob", "bob@x.com", "h".into()))
            .await
            .unwrap();
        (GraphServiceImpl::new(repo, EventBus::default()), alice, bob)
    }

    fn ids(list: &FollowList) -> Vec<Uuid> {
        list.items().iter().map(|u| u.id).collect()
    }

    #[tokio::test]
    async fn test_follow_updates_both_views() {
        let (service, alice, bob) = seeded().await;

        let actor = service.follow(alice.id, "bob").await.unwrap();

        assert_eq!(actor.id, alice.id);
        let following = service.following_of(alice.id).await.unwrap();
        let followers = service.followers_of(bob.id).await.unwrap();
        assert!(following.contains(bob.id));
        assert!(followers.contains(alice.id));
        assert_eq!(following.count(), following.items().len());
        assert_eq!(followers.count(), followers.items().len());
    }

    #[tokio::test]
    async fn test_follow_is_idempotent() {
        let (service, alice, _) = seeded().await;

        service.follow(alice.id, "bob").await.unwrap();
        let once = ids(&service.following_of(alice.id).await.unwrap());
        service.follow(alice.id, "bob").await.unwrap();
        let twice = ids(&service.following_of(alice.id).await.unwrap());

        assert_eq!(once, twice);
        assert_eq!(twice.len(), 1);
    }

    #[tokio::test]
    async fn test_follow_then_unfollow_restores_state() {
        let (service, alice, bob) = seeded().await;
        let before_following = ids(&service.following_of(alice.id).await.unwrap());
        let before_followers = ids(&service.followers_of(bob.id).await.unwrap());

        service.follow(alice.id, "bob").await.unwrap();
        service.unfollow(alice.id, "bob").await.unwrap();

        assert_eq!(ids(&service.following_of(alice.id).await.unwrap()), before_following);
        assert_eq!(ids(&service.followers_of(bob.id).await.unwrap()), before_followers);
    }

    #[tokio::test]
    async fn test_unfollow_without_edge_is_noop() {
        let (service, alice, _) = seeded().await;

        let actor = service.unfollow(alice.id, "bob").await.unwrap();

        assert_eq!(actor.id, alice.id);
        assert_eq!(service.following_of(alice.id).await.unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_target_lookup_is_case_insensitive() {
        let (service, alice, bob) = seeded().await;

        service.follow(alice.id, "BoB").await.unwrap();

        assert!(service.followers_of(bob.id).await.unwrap().contains(alice.id));
    }

    #[tokio::test]
    async fn test_unknown_target_fails() {
        let (service, alice, _) = seeded().await;

        assert!(matches!(
            service.follow(alice.id, "nonexistent").await,
            Err(GraphError::TargetNotFound)
        ));
        assert!(matches!(
            service.unfollow(alice.id, "nonexistent").await,
            Err(GraphError::TargetNotFound)
        ));
    }

    #[tokio::test]
    async fn test_self_follow_is_allowed() {
        let (service, alice, _) = seeded().await;

        service.follow(alice.id, "alice").await.unwrap();

        assert!(service.following_of(alice.id).await.unwrap().contains(alice.id));
        assert!(service.followers_of(alice.id).await.unwrap().contains(alice.id));
    }

    #[tokio::test]
    async fn test_follow_publishes_event_only_on_change() {
        let repo = Arc::new(InMemoryUserRepository::new());
        let alice = repo.create(&User::new("alice", "a@x.com", "h".into())).await.unwrap();
        let bob = repo.create(&User::new("bob", "b@x.com", "h".into())).await.unwrap();
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();
        let service = GraphServiceImpl::new(repo, bus);

        service.follow(alice.id, "bob").await.unwrap();
        service.follow(alice.id, "bob").await.unwrap();

        match rx.try_recv().unwrap() {
            DomainEvent::FollowAdded { follower, followee } => {
                assert_eq!(follower.id, alice.id);
                assert_eq!(followee.id, bob.id);
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_storage_failure_is_translated() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_followed_by()
            .returning(|_| Err(AppError::Internal("connection refused".into())));
        let service = GraphServiceImpl::new(Arc::new(repo), EventBus::default());

        assert!(matches!(
            service.followers_of(Uuid::new_v4()).await,
            Err(GraphError::Storage(_))
        ));
    }
}
