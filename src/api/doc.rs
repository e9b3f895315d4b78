use utoipa::OpenApi;

pub const PRODUCT_TAG: &str = "Products";
pub const HEALTH_TAG: &str = "Health";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Catalog",
        description = "Product catalog CRUD API",
    ),
    paths(
        crate::api::handlers::products::list_products,
        crate::api::handlers::products::get_product,
        crate::api::handlers::products::create_product,
        crate::api::handlers::products::update_product,
        crate::api::handlers::products::delete_product,
        crate::api::handlers::health::health_check,
        crate::api::handlers::health::readiness_check,
        crate::api::handlers::health::liveness_check,
    ),
    components(
        schemas(
            crate::api::dto::ErrorResponse,
            crate::api::dto::ProductPayload,
            crate::models::Product,
            crate::api::dto::HealthResponse,
            crate::api::dto::HealthStatus,
            crate::api::dto::ComponentHealth,
        )
    ),
    tags(
        (name = PRODUCT_TAG, description = "Product catalog endpoints"),
        (name = HEALTH_TAG, description = "Health check endpoints"),
    )
)]
pub struct ApiDoc;
