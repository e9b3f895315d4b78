//! Application state for Axum web framework.

use crate::db::AsyncDbPool;
use crate::services::Services;

/// Shared state handed to every request handler.
///
/// Cloning is cheap: the services and the pool are reference counted.
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    /// Pool used by the health probes; `None` when no database is attached
    pub db_pool: Option<AsyncDbPool>,
}

impl AppState {
    pub fn new(services: Services, db_pool: Option<AsyncDbPool>) -> Self {
        Self { services, db_pool }
    }
}
