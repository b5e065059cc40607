//! Domain entities and their repository contracts.

pub mod message;
pub mod user;

pub use message::{Message, MessageRepository, MAX_MESSAGE_LENGTH};
pub use user::{
    normalize, validate_username, CurrentUser, FollowList, User, UserRepository,
    USERNAME_MAX_LENGTH, USERNAME_MIN_LENGTH,
};
#[cfg(test)]
pub use user::MockUserRepository;
