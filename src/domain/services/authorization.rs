//! Authorization gate.
//!
//! The single check applied before any identity-requiring operation, on both
//! the HTTP and the gateway transport.

use crate::domain::entities::CurrentUser;

/// Raised when an operation requires identity and none was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Not authenticated")]
pub struct Unauthenticated;

/// Fail closed unless an identity is present.
pub fn require_user(current: Option<CurrentUser>) -> Result<CurrentUser, Unauthenticated> {
    current.ok_or(Unauthenticated)
}
