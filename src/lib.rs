//! # Social Graph Library
//!
//! This crate provides a small social-graph backend with:
//! - Account registration and login (argon2 hashes, signed JWT tokens)
//! - Identity resolution from a cookie or `Authorization` header for HTTP
//!   requests, and from the connection-init payload for gateway connections
//! - Idempotent follow/unfollow with followers/following views
//! - A WebSocket gateway for requests and live events
//!
//! ## Architecture
//!
//! - **Domain Layer**: Core entities and repository traits
//! - **Application Layer**: Services, events, and DTOs
//! - **Infrastructure Layer**: PostgreSQL/in-memory repositories and metrics
//! - **Presentation Layer**: HTTP handlers, middleware, and WebSocket gateway
//!
//! ## Module Structure
//!
//! ```text
//! social_graph/
//! +-- config/         Configuration management
//! +-- domain/         Entities, repository traits, authorization guard
//! +-- application/    Services, domain events, and DTOs
//! +-- infrastructure/ Database, repositories, metrics
//! +-- presentation/   HTTP routes and WebSocket gateway
//! +-- shared/         Errors and validation helpers
//! ```

// Configuration module
pub mod config;

// Domain layer - Core business logic
pub mod domain;

// Application layer - Business services
pub mod application;

// Infrastructure layer - External implementations
pub mod infrastructure;

// Presentation layer - HTTP and WebSocket handlers
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;
