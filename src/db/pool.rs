//! Async database connection pool implementation.
//!
//! Uses bb8 connection pool manager with diesel_async for PostgreSQL connections.

use std::time::Duration;

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::Pool;

use crate::config::DatabaseConfig;
use crate::error::AppError;

/// Async connection pool type alias.
///
/// bb8::Pool internally uses Arc, so Clone is cheap (just reference count increment).
/// Structures holding AsyncDbPool can derive Clone without additional Arc wrapping.
pub type AsyncDbPool = Pool<AsyncPgConnection>;

/// Creates an async database connection pool from the database settings.
///
/// The pool connects to `{url}/{name}` and is sized by `max_connections`
/// and `min_connections`. One connection is checked out immediately so a
/// bad connection string fails at startup rather than on the first request.
///
/// # Errors
///
/// - `AppError::ConnectionPool` - if the pool cannot be built or the
///   database does not answer within `connection_timeout`
pub async fn establish_async_connection_pool(
    config: &DatabaseConfig,
) -> Result<AsyncDbPool, AppError> {
    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(config.connection_url());

    let pool = Pool::builder()
        .max_size(config.max_connections)
        .min_idle(Some(config.min_connections))
        .connection_timeout(Duration::from_secs(config.connection_timeout))
        .build(manager)
        .await
        .map_err(|e| AppError::ConnectionPool {
            source: anyhow::anyhow!("Failed to build connection pool: {}", e),
        })?;

    {
        let _probe = pool.get().await.map_err(|e| AppError::ConnectionPool {
            source: anyhow::anyhow!("Database connection failed: {}", e),
        })?;
    }

    tracing::info!(
        database = %config.name,
        max_connections = config.max_connections,
        "Connected to database"
    );

    Ok(pool)
}
