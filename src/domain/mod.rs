//! # Domain Layer
//!
//! The domain layer contains the core business rules of the social graph.
//! It is independent of any external frameworks or infrastructure concerns.
//!
//! ## Structure
//!
//! - **entities**: Users, the follow relation views, messages, and their repository traits
//! - **services**: The authorization gate
//!
//! ## Design Principles
//!
//! - No dependencies on infrastructure or presentation layers
//! - Repository traits define data access contracts

pub mod entities;
pub mod services;

// Re-export commonly used types
pub use entities::*;
pub use services::*;
