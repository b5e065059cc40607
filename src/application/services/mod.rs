//! Application Services
//!
//! Business logic services that coordinate domain operations.
//!
//! ## Available Services
//!
//! - **CredentialService**: Argon2 password hashing and identifier normalization
//! - **TokenService**: Session token issue/verify
//! - **IdentityResolver**: Per-transport credential to `CurrentUser` resolution
//! - **AuthService**: Registration and login
//! - **GraphService**: Follow/unfollow and follower/following views
//! - **MessageService**: Message posting and listing

pub mod auth_service;
pub mod credential_service;
pub mod graph_service;
pub mod identity_service;
pub mod message_service;
pub mod token_service;

pub use auth_service::{AuthError, AuthService, AuthServiceImpl, LoginOutcome};
pub use credential_service::{CredentialError, CredentialService};
pub use graph_service::{GraphError, GraphService, GraphServiceImpl};
pub use identity_service::{CredentialSource, IdentityResolver};
pub use message_service::{MessageError, MessageService, MessageServiceImpl};
pub use token_service::{SessionClaims, TokenError, TokenService};
