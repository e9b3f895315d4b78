//! Embedded schema migrations.
//!
//! Migrations run over a blocking `PgConnection` on tokio's blocking pool,
//! separate from the async request pool.

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

use crate::error::{AppError, AppResult};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Applies every pending migration and returns the applied versions.
pub async fn run_pending_migrations(database_url: String) -> AppResult<Vec<String>> {
    with_connection(database_url, |conn| {
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| migration_error("run pending migrations", e))?;
        Ok(applied.iter().map(|m| m.to_string()).collect())
    })
    .await
}

/// Lists pending migrations without applying them.
pub async fn pending_migrations(database_url: String) -> AppResult<Vec<String>> {
    with_connection(database_url, |conn| {
        let pending = conn
            .pending_migrations(MIGRATIONS)
            .map_err(|e| migration_error("check pending migrations", e))?;
        Ok(pending.iter().map(|m| m.name().to_string()).collect())
    })
    .await
}

/// Reverts the last `steps` migrations and returns the reverted versions.
pub async fn revert_migrations(database_url: String, steps: u32) -> AppResult<Vec<String>> {
    with_connection(database_url, move |conn| {
        let mut reverted = Vec::new();
        for _ in 0..steps {
            match conn.revert_last_migration(MIGRATIONS) {
                Ok(version) => reverted.push(version.to_string()),
                Err(e) => {
                    if reverted.is_empty() {
                        return Err(migration_error("revert migration", e));
                    }
                    tracing::warn!(error = %e, "Stopped reverting migrations early");
                    break;
                }
            }
        }
        Ok(reverted)
    })
    .await
}

async fn with_connection<T, F>(database_url: String, work: F) -> AppResult<T>
where
    T: Send + 'static,
    F: FnOnce(&mut PgConnection) -> AppResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut conn = PgConnection::establish(&database_url).map_err(|e| AppError::Database {
            operation: "establish connection for migrations".to_string(),
            source: anyhow::anyhow!("Connection error: {}", e),
        })?;
        work(&mut conn)
    })
    .await
    .map_err(|e| AppError::Internal {
        source: anyhow::Error::from(e),
    })?
}

fn migration_error(
    operation: &str,
    error: Box<dyn std::error::Error + Send + Sync>,
) -> AppError {
    AppError::Database {
        operation: operation.to_string(),
        source: anyhow::anyhow!("Migration error: {}", error),
    }
}
