use crate::error::AppError;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// Name of the unique index guarding the external product identifier.
pub const PRODUCT_ID_UNIQUE_INDEX: &str = "products_product_id_key";

/// Converts Diesel errors into [`AppError`] variants.
///
/// Store failures stay opaque (`AppError::Database`) with two exceptions:
/// the store's "no rows" signal becomes `NotFound`, and a violation of the
/// product identifier's unique index becomes `IdAlreadyExists`.
pub struct DatabaseErrorConverter;

impl DatabaseErrorConverter {
    /// Converts a Diesel error to an appropriate AppError variant.
    ///
    /// # Arguments
    /// * `error` - The Diesel error to convert
    /// * `operation` - Description of the database operation that failed
    pub fn convert_diesel_error(error: DieselError, operation: &str) -> AppError {
        match error {
            DieselError::NotFound => AppError::NotFound {
                entity: "resource".to_string(),
                field: "id".to_string(),
                value: "unknown".to_string(),
            },
            DieselError::DatabaseError(kind, info) => {
                Self::convert_database_error(kind, info, operation)
            }
            other => AppError::Database {
                operation: operation.to_string(),
                source: anyhow::Error::from(other),
            },
        }
    }

    /// Same as [`convert_diesel_error`](Self::convert_diesel_error) but reports
    /// a missing row as a product lookup miss for `product_id`.
    pub fn convert_product_lookup(error: DieselError, product_id: &str, operation: &str) -> AppError {
        match error {
            DieselError::NotFound => AppError::product_not_found(product_id),
            other => Self::convert_diesel_error(other, operation),
        }
    }

    fn convert_database_error(
        kind: DatabaseErrorKind,
        info: Box<dyn diesel::result::DatabaseErrorInformation + Send + Sync>,
        operation: &str,
    ) -> AppError {
        let message = info.message().to_string();

        match kind {
            DatabaseErrorKind::UniqueViolation
                if info.constraint_name() == Some(PRODUCT_ID_UNIQUE_INDEX) =>
            {
                AppError::IdAlreadyExists
            }
            DatabaseErrorKind::UniqueViolation => AppError::Database {
                operation: operation.to_string(),
                source: anyhow::Error::msg(format!("Unique constraint violation: {}", message)),
            },
            DatabaseErrorKind::ClosedConnection => AppError::ConnectionPool {
                source: anyhow::Error::msg(format!("Connection closed: {}", message)),
            },
            _ => AppError::Database {
                operation: operation.to_string(),
                source: anyhow::Error::msg(format!("Database error: {}", message)),
            },
        }
    }
}
