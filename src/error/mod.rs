mod app_error;
mod database_converter;

pub use app_error::{AppError, AppResult, ErrorKind, ValidationFailure};
pub use database_converter::{DatabaseErrorConverter, PRODUCT_ID_UNIQUE_INDEX};
