//! Server module for managing HTTP server lifecycle
//!
//! This module handles server initialization, startup, and graceful shutdown.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::signal;

use crate::api::routes::{create_router, with_request_timeout};
use crate::config::{Environment, Settings};
use crate::db::{establish_async_connection_pool, run_pending_migrations};
use crate::repositories::PgProductRepository;
use crate::services::Services;
use crate::state::AppState;

/// HTTP server manager
pub struct Server {
    settings: Settings,
    environment: Environment,
}

impl Server {
    pub fn new(settings: Settings, environment: Environment) -> Self {
        Self {
            settings,
            environment,
        }
    }

    /// Start the server and run until shutdown signal
    ///
    /// This method:
    /// 1. Connects the database pool, applying migrations if configured
    /// 2. Wires repository, service and application state
    /// 3. Binds to the configured address
    /// 4. Serves requests until Ctrl+C or SIGTERM
    ///
    /// # Errors
    /// - Database connection or migration errors
    /// - Address binding errors
    /// - Server runtime errors
    pub async fn run(self) -> anyhow::Result<()> {
        tracing::info!(
            app_name = %self.settings.application.name,
            app_version = %self.settings.application.version,
            environment = %self.environment,
            "Application starting"
        );

        tracing::info!(
            host = %self.settings.server.host,
            port = %self.settings.server.port,
            request_timeout = %self.settings.server.request_timeout,
            "Server configuration loaded"
        );

        // Connection string is left out, it may carry credentials
        let database = &self.settings.database;
        tracing::info!(
            database = %database.name,
            max_connections = %database.max_connections,
            min_connections = %database.min_connections,
            operation_timeout = %database.operation_timeout,
            auto_migrate = %database.auto_migrate,
            "Database configuration loaded"
        );

        let pool = establish_async_connection_pool(database).await?;

        if database.auto_migrate {
            let applied = run_pending_migrations(database.connection_url()).await?;
            tracing::info!(count = applied.len(), migrations = ?applied, "Migrations applied");
        }

        let repository = PgProductRepository::new(
            pool.clone(),
            Duration::from_secs(database.operation_timeout),
        );
        let services = Services::new(Arc::new(repository));
        let state = AppState::new(services, Some(pool));

        let router = with_request_timeout(
            create_router(state),
            Duration::from_secs(self.settings.server.request_timeout),
        );

        let address = self.settings.server.address();
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!(error = %e, address = %address, "Failed to bind to address");
            anyhow::anyhow!("Failed to bind to {}: {}", address, e)
        })?;

        tracing::info!(address = %address, "Server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}

/// Waits for Ctrl+C or SIGTERM.
///
/// If a handler cannot be installed the failure is logged and that signal
/// is never observed.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
