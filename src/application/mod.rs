//! Application Layer
//!
//! Contains business logic services, the in-process event bus, and data
//! transfer objects (DTOs). This layer orchestrates the flow of data between
//! the presentation and domain layers.

pub mod dto;
pub mod events;
pub mod services;
