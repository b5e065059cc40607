//! Middleware
//!
//! Tower middleware for request processing.

pub mod cors;
pub mod identity;
pub mod logging;
pub mod metrics;

pub use identity::{identity_middleware, ResolvedIdentity};
