//! Health check endpoint handlers.
//!
//! Health checks ping the database through the connection pool directly,
//! bypassing the service layer.

use std::collections::HashMap;
use std::time::Instant;

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};

use crate::api::doc::HEALTH_TAG;
use crate::api::dto::{ComponentHealth, HealthResponse, HealthStatus};
use crate::state::AppState;

/// Creates health check routes.
///
/// # Routes
/// - `GET /health` - Detailed health check
/// - `GET /health/ready` - Readiness probe
/// - `GET /health/live` - Liveness probe
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/ready", get(readiness_check))
        .route("/health/live", get(liveness_check))
}

/// Detailed health check
///
/// Reports every component; answers 503 with the same body when any
/// component is unhealthy.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Service is unhealthy", body = HealthResponse)
    ),
    tag = HEALTH_TAG
)]
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database = check_database(&state).await;
    let status = database.status;

    let mut checks = HashMap::new();
    checks.insert("database".to_string(), database);

    let response = HealthResponse {
        status,
        version: crate::pkg_version().to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        checks,
    };

    let code = match status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };
    (code, Json(response))
}

/// Readiness probe
#[utoipa::path(
    get,
    path = "/health/ready",
    responses(
        (status = 200, description = "Service is ready"),
        (status = 503, description = "Service is not ready")
    ),
    tag = HEALTH_TAG
)]
pub async fn readiness_check(State(state): State<AppState>) -> StatusCode {
    match check_database(&state).await.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Liveness probe
///
/// Does not touch external dependencies.
#[utoipa::path(
    get,
    path = "/health/live",
    responses((status = 200, description = "Service is alive")),
    tag = HEALTH_TAG
)]
pub async fn liveness_check() -> StatusCode {
    StatusCode::OK
}

async fn check_database(state: &AppState) -> ComponentHealth {
    use diesel_async::RunQueryDsl;

    let start = Instant::now();
    let elapsed_ms = |start: Instant| Some(start.elapsed().as_millis() as u64);

    let Some(pool) = state.db_pool.as_ref() else {
        return ComponentHealth {
            status: HealthStatus::Unhealthy,
            message: Some("Database not configured".to_string()),
            response_time_ms: None,
        };
    };

    let mut conn = match pool.get().await {
        Ok(conn) => conn,
        Err(e) => {
            return ComponentHealth {
                status: HealthStatus::Unhealthy,
                message: Some(format!("Connection failed: {}", e)),
                response_time_ms: elapsed_ms(start),
            };
        }
    };

    match diesel::sql_query("SELECT 1").execute(&mut conn).await {
        Ok(_) => ComponentHealth {
            status: HealthStatus::Healthy,
            message: Some("Connected".to_string()),
            response_time_ms: elapsed_ms(start),
        },
        Err(e) => ComponentHealth {
            status: HealthStatus::Unhealthy,
            message: Some(format!("Query failed: {}", e)),
            response_time_ms: elapsed_ms(start),
        },
    }
}
