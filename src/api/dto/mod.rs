//! Data Transfer Objects for API requests and responses.
//!
//! - `product` - product request payloads
//! - `error` - the common error body
//! - `health` - health check responses

mod error;
mod health;
mod product;

pub use error::ErrorResponse;
pub use health::{ComponentHealth, HealthResponse, HealthStatus};
pub use product::ProductPayload;
