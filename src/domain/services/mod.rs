//! Domain services.

pub mod authorization;

pub use authorization::{require_user, Unauthenticated};
