//! Product CRUD request handlers.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    routing::get,
};

use crate::api::doc::PRODUCT_TAG;
use crate::api::dto::{ErrorResponse, ProductPayload};
use crate::api::middleware::json_rejection_to_error;
use crate::error::{AppError, AppResult};
use crate::models::Product;
use crate::services::validate_new_product;
use crate::state::AppState;

/// Creates product routes.
///
/// Routes:
/// - GET    /products       - List all products
/// - POST   /products       - Create a product
/// - GET    /products/{id}  - Get a product by `product_id`
/// - PUT    /products/{id}  - Update a product
/// - DELETE /products/{id}  - Delete a product
///
/// `/products/` with an empty identifier answers 400.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/",
            get(missing_product_id)
                .put(missing_product_id)
                .delete(missing_product_id),
        )
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
}

fn payload_product(payload: Result<Json<ProductPayload>, JsonRejection>) -> AppResult<Product> {
    let Json(payload) = payload.map_err(json_rejection_to_error)?;
    Ok(payload.into_product())
}

async fn missing_product_id() -> AppError {
    AppError::IdRequired
}

/// List all products
#[utoipa::path(
    get,
    path = "/products",
    responses(
        (status = 200, description = "All products", body = Vec<Product>),
        (status = 404, description = "The catalog is empty", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    tag = PRODUCT_TAG
)]
pub async fn list_products(State(state): State<AppState>) -> AppResult<Json<Vec<Product>>> {
    let products = state.services.products.get_all().await?;
    Ok(Json(products))
}

/// Get a product by its identifier
#[utoipa::path(
    get,
    path = "/products/{id}",
    params(("id" = String, Path, description = "Product identifier")),
    responses(
        (status = 200, description = "The product", body = Product),
        (status = 400, description = "Missing identifier", body = ErrorResponse),
        (status = 404, description = "No such product", body = ErrorResponse)
    ),
    tag = PRODUCT_TAG
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Product>> {
    let product = state.services.products.get_by_id(&id).await?;
    Ok(Json(product))
}

/// Create a product
///
/// Fields are validated first. A supplied `product_id` that already
/// resolves to a product is then rejected before the create path runs;
/// lookup failures are ignored here and left to the service.
#[utoipa::path(
    post,
    path = "/products",
    request_body = ProductPayload,
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 400, description = "Invalid payload or identifier taken", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    tag = PRODUCT_TAG
)]
pub async fn create_product(
    State(state): State<AppState>,
    payload: Result<Json<ProductPayload>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Product>)> {
    let product = payload_product(payload)?;
    validate_new_product(&product)?;

    if !product.product_id.is_empty()
        && state
            .services
            .products
            .get_by_id(&product.product_id)
            .await
            .is_ok()
    {
        return Err(AppError::IdAlreadyExists);
    }

    let created = state.services.products.create_product(product).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a product
///
/// Fields left at their zero value keep the stored value.
#[utoipa::path(
    put,
    path = "/products/{id}",
    params(("id" = String, Path, description = "Product identifier")),
    request_body = ProductPayload,
    responses(
        (status = 200, description = "Merged product", body = Product),
        (status = 400, description = "Invalid payload or identifier change", body = ErrorResponse),
        (status = 404, description = "No such product", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    tag = PRODUCT_TAG
)]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ProductPayload>, JsonRejection>,
) -> AppResult<Json<Product>> {
    let patch = payload_product(payload)?;
    let updated = state.services.products.update_product(&id, patch).await?;
    Ok(Json(updated))
}

/// Delete a product
#[utoipa::path(
    delete,
    path = "/products/{id}",
    params(("id" = String, Path, description = "Product identifier")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 400, description = "Missing identifier", body = ErrorResponse),
        (status = 404, description = "No such product", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    tag = PRODUCT_TAG
)]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.services.products.delete_product(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::routes::create_router;
    use crate::error::ValidationFailure;
    use crate::services::{MockProductService, Services};
    use axum::body::Body;
    use axum::http::{Request, header};
    use axum::response::Response;
    use chrono::Utc;
    use mockall::predicate::eq;
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(service: MockProductService) -> Router {
        let services = Services::from_product_service(Arc::new(service));
        create_router(AppState::new(services, None))
    }

    fn stored(product_id: &str) -> Product {
        let mut product = Product {
            product_id: product_id.to_string(),
            name: "Widget".to_string(),
            description: "A widget".to_string(),
            price: 10.0,
            stock: 5,
            ..Default::default()
        };
        product.stamp_created(Utc::now());
        product
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_create_returns_201_with_entity() {
        let mut service = MockProductService::new();
        service.expect_get_by_id().never();
        service.expect_create_product().times(1).returning(|mut product| {
            product.product_id = "generated".to_string();
            product.stamp_created(Utc::now());
            Ok(product)
        });

        let response = app(service)
            .oneshot(json_request(
                "POST",
                "/products",
                json!({ "name": "Widget", "description": "A widget", "price": 10.0, "stock": 5 }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["product_id"], "generated");
        assert_eq!(body["name"], "Widget");
        assert_eq!(body["created_at"], body["updated_at"]);
    }

    #[tokio::test]
    async fn test_create_with_existing_id_is_rejected_before_service_create() {
        let mut service = MockProductService::new();
        service
            .expect_get_by_id()
            .with(eq("sku-1"))
            .returning(|id| Ok(stored(id)));
        service.expect_create_product().never();

        let response = app(service)
            .oneshot(json_request(
                "POST",
                "/products",
                json!({ "product_id": "sku-1", "name": "Widget", "description": "A widget", "price": 1.0 }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["message"], "product ID already exists");
    }

    #[tokio::test]
    async fn test_create_precheck_ignores_lookup_failure() {
        let mut service = MockProductService::new();
        service.expect_get_by_id().returning(|_| Err(AppError::NotInitialized));
        service
            .expect_create_product()
            .returning(|product| Ok(product));

        let response = app(service)
            .oneshot(json_request(
                "POST",
                "/products",
                json!({ "product_id": "sku-2", "name": "Widget", "description": "A widget", "price": 1.0 }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_create_malformed_body_is_400() {
        let mut service = MockProductService::new();
        service.expect_create_product().never();

        let response = app(service)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/products")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{ not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["message"], "invalid request body");
    }

    #[tokio::test]
    async fn test_create_validation_error_is_400() {
        let mut service = MockProductService::new();
        service.expect_create_product().never();

        let response = app(service)
            .oneshot(json_request("POST", "/products", json!({ "price": 3.0 })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["message"],
            ValidationFailure::NameRequired.to_string()
        );
    }

    #[tokio::test]
    async fn test_create_invalid_body_with_id_skips_lookup() {
        let mut service = MockProductService::new();
        service.expect_get_by_id().never();
        service.expect_create_product().never();

        let response = app(service)
            .oneshot(json_request(
                "POST",
                "/products",
                json!({ "product_id": "sku-1", "name": "Widget", "description": "A widget", "price": -1.0 }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["message"],
            "product price must be greater than zero"
        );
    }

    #[tokio::test]
    async fn test_create_upstream_failure_is_sanitized_500() {
        let mut service = MockProductService::new();
        service.expect_create_product().returning(|_| {
            Err(AppError::Database {
                operation: "insert product".to_string(),
                source: anyhow::anyhow!("disk full"),
            })
        });

        let response = app(service)
            .oneshot(json_request(
                "POST",
                "/products",
                json!({ "name": "Widget", "description": "A widget", "price": 1.0 }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["message"], "internal server error");
    }

    #[tokio::test]
    async fn test_list_empty_catalog_is_404() {
        let mut service = MockProductService::new();
        service
            .expect_get_all()
            .returning(|| Err(AppError::NoProductsFound));

        let response = app(service)
            .oneshot(empty_request("GET", "/products"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await,
            json!({ "message": "no products found" })
        );
    }

    #[tokio::test]
    async fn test_list_returns_array() {
        let mut service = MockProductService::new();
        service
            .expect_get_all()
            .returning(|| Ok(vec![stored("a"), stored("b")]));

        let response = app(service)
            .oneshot(empty_request("GET", "/products"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_get_missing_product_is_404() {
        let mut service = MockProductService::new();
        service
            .expect_get_by_id()
            .with(eq("nope"))
            .returning(|id| Err(AppError::product_not_found(id)));

        let response = app(service)
            .oneshot(empty_request("GET", "/products/nope"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_empty_path_id_is_400() {
        for method in ["GET", "PUT", "DELETE"] {
            let response = app(MockProductService::new())
                .oneshot(empty_request(method, "/products/"))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", method);
            assert_eq!(body_json(response).await["message"], "product ID is required");
        }
    }

    #[tokio::test]
    async fn test_update_returns_merged_entity() {
        let mut service = MockProductService::new();
        service
            .expect_update_product()
            .times(1)
            .returning(|id, patch| {
                assert_eq!(id, "p-1");
                assert_eq!(patch.price, 12.0);
                assert!(patch.name.is_empty());
                let mut merged = stored(id);
                merged.price = patch.price;
                Ok(merged)
            });

        let response = app(service)
            .oneshot(json_request("PUT", "/products/p-1", json!({ "price": 12.0 })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["price"], 12.0);
        assert_eq!(body["name"], "Widget");
    }

    #[tokio::test]
    async fn test_update_id_change_is_400() {
        let mut service = MockProductService::new();
        service
            .expect_update_product()
            .returning(|_, _| Err(AppError::IdCannotBeChanged));

        let response = app(service)
            .oneshot(json_request("PUT", "/products/X", json!({ "product_id": "Y" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["message"], "product ID cannot be changed");
    }

    #[tokio::test]
    async fn test_delete_returns_204_with_empty_body() {
        let mut service = MockProductService::new();
        service
            .expect_delete_product()
            .with(eq("p-1"))
            .times(1)
            .returning(|_| Ok(()));

        let response = app(service)
            .oneshot(empty_request("DELETE", "/products/p-1"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn test_not_initialized_is_500() {
        let mut service = MockProductService::new();
        service
            .expect_delete_product()
            .returning(|_| Err(AppError::NotInitialized));

        let response = app(service)
            .oneshot(empty_request("DELETE", "/products/p-1"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
