//! Application Startup
//!
//! Application building and server initialization.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use sqlx::PgPool;
use tokio::net::TcpListener;

use crate::application::events::EventBus;
use crate::application::services::{
    AuthService, AuthServiceImpl, CredentialService, GraphService, GraphServiceImpl,
    IdentityResolver, MessageService, MessageServiceImpl, TokenService,
};
use crate::config::Settings;
use crate::domain::{MessageRepository, UserRepository};
use crate::infrastructure::database;
use crate::infrastructure::repositories::{
    InMemoryMessageRepository, InMemoryUserRepository, PgMessageRepository, PgUserRepository,
};
use crate::presentation::http::{handlers, routes};
use crate::presentation::middleware::{cors, logging};
use crate::presentation::websocket::Gateway;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<dyn AuthService>,
    pub graph: Arc<dyn GraphService>,
    pub messages: Arc<dyn MessageService>,
    pub identity: Arc<IdentityResolver>,
    pub events: EventBus,
    pub gateway: Arc<Gateway>,
    /// `None` when running on the in-memory store
    pub db: Option<PgPool>,
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Wire services over the given repositories.
    pub fn new(
        settings: Settings,
        user_repo: Arc<dyn UserRepository>,
        message_repo: Arc<dyn MessageRepository>,
        db: Option<PgPool>,
    ) -> Self {
        let events = EventBus::default();
        let tokens = Arc::new(TokenService::new(&settings.jwt));

        let auth = Arc::new(AuthServiceImpl::new(
            user_repo.clone(),
            CredentialService::new(),
            tokens.clone(),
        ));
        let graph = Arc::new(GraphServiceImpl::new(user_repo, events.clone()));
        let messages = Arc::new(MessageServiceImpl::new(message_repo, events.clone()));

        Self {
            auth,
            graph,
            messages,
            identity: Arc::new(IdentityResolver::new(tokens)),
            events,
            gateway: Arc::new(Gateway::new(settings.websocket.heartbeat_interval_ms)),
            db,
            settings: Arc::new(settings),
        }
    }

    /// State backed by process-local storage. Nothing survives a restart.
    pub fn in_memory(settings: Settings) -> Self {
        Self::new(
            settings,
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryMessageRepository::new()),
            None,
        )
    }

    /// PostgreSQL when `database.url` is set, in-memory otherwise.
    pub async fn build(settings: Settings) -> Result<Self> {
        let Some(url) = settings.database.url.clone() else {
            tracing::warn!("No database URL configured, using in-memory store");
            return Ok(Self::in_memory(settings));
        };

        let db = database::create_pool(&settings.database, &url)
            .await
            .context("Failed to connect to database")?;
        tracing::info!("Database connection pool created");

        if settings.database.run_migrations {
            database::run_migrations(&db)
                .await
                .context("Failed to run database migrations")?;
            tracing::info!("Database migrations applied");
        }

        Ok(Self::new(
            settings,
            Arc::new(PgUserRepository::new(db.clone())),
            Arc::new(PgMessageRepository::new(db.clone())),
            Some(db),
        ))
    }

    /// Full router with the outer middleware stack.
    pub fn router(&self) -> Router {
        routes::create_router(self.clone())
            .layer(logging::create_trace_layer())
            .layer(cors::create_cors_layer(&self.settings.cors))
    }
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        handlers::health::init_server_start();

        let addr = settings.server_addr();
        let state = AppState::build(settings).await?;
        let router = state.router();

        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;
        tracing::info!("Listening on {}", listener.local_addr()?);

        Ok(Self { listener, router })
    }

    /// Run the server until Ctrl+C or SIGTERM
    pub async fn run_until_stopped(self) -> Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        tracing::info!("Server stopped");
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
