//! # Social Graph Server
//!
//! Application entry point that initializes:
//! - Tracing/logging subsystem
//! - Configuration loading
//! - Storage (PostgreSQL when configured, in-memory otherwise)
//! - HTTP/WebSocket server

use anyhow::Result;
use tracing::info;

use social_graph::config::Settings;
use social_graph::startup::Application;

#[tokio::main]
async fn main() -> Result<()> {
    social_graph::telemetry::init_tracing();

    info!("Starting social graph server...");

    let settings = Settings::load()?;
    info!(
        host = %settings.server.host,
        port = %settings.server.port,
        environment = %settings.environment,
        database = settings.database.url.is_some(),
        "Configuration loaded"
    );

    let application = Application::build(settings).await?;

    info!("Server ready to accept connections");
    application.run_until_stopped().await?;

    Ok(())
}
