//! Router configuration for the API.

use std::time::Duration;

use axum::{Json, Router, http::StatusCode, middleware, routing::get};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use utoipa::OpenApi;

use crate::api::doc::ApiDoc;
use crate::api::handlers;
use crate::api::middleware::{global_error_handler, logging_middleware, request_id_middleware};
use crate::state::AppState;

const WELCOME_MESSAGE: &str = "Welcome to the catalog-rs product API";

/// Creates the main application router with all routes and middleware.
///
/// # Middleware Order
/// Last added runs first:
/// 1. CORS and compression
/// 2. Request ID - generates/propagates request IDs
/// 3. Logging - logs requests with request IDs
/// 4. Global error handler - reshapes non-JSON error responses
///
/// # Routes
/// - `/` - welcome text
/// - `/products` - product CRUD
/// - `/health` - health probes
/// - `/api-docs/openapi.json` - OpenAPI document
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(welcome))
        .route("/api-docs/openapi.json", get(openapi_json))
        .merge(handlers::products::product_routes())
        .merge(handlers::health::health_routes())
        .layer(middleware::from_fn(global_error_handler))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bounds every request by `timeout`; requests that run longer are
/// answered 408 with the usual `{"message"}` body.
pub fn with_request_timeout(router: Router, timeout: Duration) -> Router {
    router
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
        .layer(middleware::from_fn(global_error_handler))
}

async fn welcome() -> &'static str {
    WELCOME_MESSAGE
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
