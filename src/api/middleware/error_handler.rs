//! Conversion of errors into HTTP responses.
//!
//! Every error response has the body `{"message": "..."}`. Client errors
//! carry the error's display text; server errors are logged with their
//! source chain and answered with a fixed message.

use axum::{
    Json,
    extract::{Request, rejection::JsonRejection},
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::api::dto::ErrorResponse;
use crate::error::{AppError, ErrorKind};

const INTERNAL_SERVER_ERROR_MESSAGE: &str = "internal server error";

const INVALID_REQUEST_BODY_MESSAGE: &str = "invalid request body";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = error_to_status_code(&self);

        let message = if status.is_server_error() {
            tracing::error!(
                kind = ?self.kind(),
                error = %error_chain(&self),
                "Request failed"
            );
            INTERNAL_SERVER_ERROR_MESSAGE.to_string()
        } else {
            self.to_string()
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

/// Maps an error's kind to its HTTP status code.
///
/// | Kind | Status |
/// |---|---|
/// | InvalidArgument, ValidationFailed, Conflict | 400 |
/// | NotFound | 404 |
/// | NotInitialized, Upstream | 500 |
pub fn error_to_status_code(error: &AppError) -> StatusCode {
    match error.kind() {
        ErrorKind::InvalidArgument | ErrorKind::ValidationFailed | ErrorKind::Conflict => {
            StatusCode::BAD_REQUEST
        }
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::NotInitialized | ErrorKind::Upstream => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Turns a malformed JSON body into `InvalidArgument`.
pub fn json_rejection_to_error(rejection: JsonRejection) -> AppError {
    tracing::debug!(rejection = %rejection.body_text(), "Rejected request body");
    AppError::invalid_argument(INVALID_REQUEST_BODY_MESSAGE)
}

/// Renders an error and its sources as `outer: inner: root`.
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut chain = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        chain.push_str(": ");
        chain.push_str(&cause.to_string());
        source = cause.source();
    }
    chain
}

/// Rewrites error responses that are not JSON (unknown route, wrong method,
/// timeouts) into the `{"message"}` shape, keeping their status.
pub async fn global_error_handler(request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    let status = response.status();

    if !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json"));
    if is_json {
        return response;
    }

    let message = match status {
        StatusCode::NOT_FOUND => "resource not found",
        StatusCode::METHOD_NOT_ALLOWED => "method not allowed",
        StatusCode::REQUEST_TIMEOUT => "request timeout",
        StatusCode::UNSUPPORTED_MEDIA_TYPE => INVALID_REQUEST_BODY_MESSAGE,
        StatusCode::PAYLOAD_TOO_LARGE => "request payload too large",
        s if s.is_server_error() => INTERNAL_SERVER_ERROR_MESSAGE,
        s => s.canonical_reason().unwrap_or("request failed"),
    };

    let (mut parts, _) = response.into_parts();
    parts.headers.remove(header::CONTENT_LENGTH);
    parts.headers.remove(header::CONTENT_TYPE);

    let body = Json(ErrorResponse::new(message)).into_response();
    (parts, body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationFailure;
    use axum::{Router, body::Body, routing::get};
    use tower::ServiceExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AppError::IdRequired, StatusCode::BAD_REQUEST),
            (AppError::invalid_argument("invalid request body"), StatusCode::BAD_REQUEST),
            (AppError::from(ValidationFailure::NameRequired), StatusCode::BAD_REQUEST),
            (AppError::IdAlreadyExists, StatusCode::BAD_REQUEST),
            (AppError::IdCannotBeChanged, StatusCode::BAD_REQUEST),
            (AppError::NoProductsFound, StatusCode::NOT_FOUND),
            (AppError::product_not_found("p-1"), StatusCode::NOT_FOUND),
            (AppError::NotInitialized, StatusCode::INTERNAL_SERVER_ERROR),
            (
                AppError::Timeout {
                    operation: "find product".to_string(),
                    timeout_secs: 10,
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error_to_status_code(&error), expected, "{:?}", error);
        }
    }

    #[tokio::test]
    async fn test_client_error_body_uses_display_text() {
        let response = AppError::from(ValidationFailure::StockInvalid).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "message": "product stock cannot be negative" })
        );
    }

    #[tokio::test]
    async fn test_server_error_body_is_sanitized() {
        let response = AppError::Database {
            operation: "insert product".to_string(),
            source: anyhow::anyhow!("relation \"products\" does not exist"),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "message": "internal server error" })
        );
    }

    #[test]
    fn test_error_chain_includes_sources() {
        let error = AppError::Database {
            operation: "list products".to_string(),
            source: anyhow::anyhow!("connection reset"),
        };
        assert_eq!(
            error_chain(&error),
            "Database operation failed: list products: connection reset"
        );
    }

    #[tokio::test]
    async fn test_global_handler_wraps_plain_errors() {
        let app = Router::new()
            .route("/only-get", get(|| async { "ok" }))
            .layer(axum::middleware::from_fn(global_error_handler));

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/missing").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "message": "resource not found" })
        );

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/only-get")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "message": "method not allowed" })
        );
    }

    #[tokio::test]
    async fn test_global_handler_keeps_json_errors() {
        let app = Router::new()
            .route("/", get(|| async { AppError::NoProductsFound }))
            .layer(axum::middleware::from_fn(global_error_handler));

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "message": "no products found" })
        );
    }
}
