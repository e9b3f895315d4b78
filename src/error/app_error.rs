use crate::error::DatabaseErrorConverter;
use thiserror::Error;

/// Business-rule violations detected while validating product data.
///
/// The display text of each variant is the message returned to API clients.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationFailure {
    #[error("product name is required")]
    NameRequired,

    #[error("product description is required")]
    DescriptionRequired,

    #[error("product price must be greater than zero")]
    PriceInvalid,

    #[error("product stock cannot be negative")]
    StockInvalid,
}

/// Coarse classification of an [`AppError`].
///
/// Layers above the service only need the kind to decide how to react;
/// the handler maps each kind onto an HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or missing required input
    InvalidArgument,
    /// A product business rule was violated
    ValidationFailed,
    /// No matching product
    NotFound,
    /// The product ID already exists or would be changed
    Conflict,
    /// The persistence handle was never set up
    NotInitialized,
    /// The underlying store or runtime failed
    Upstream,
}

/// Application-wide error type.
///
/// Repository failures travel through the service unchanged; the only
/// translations are the explicit ones performed by the service (empty
/// catalog, ID rules, field validation) and by the HTTP layer (kind to status).
#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed or missing input with a human-readable message
    #[error("{message}")]
    InvalidArgument { message: String },

    /// A product identifier was required but empty
    #[error("product ID is required")]
    IdRequired,

    /// Product field validation failure
    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    /// The store reported that no row matched the lookup
    #[error("{entity} with {field} '{value}' was not found")]
    NotFound {
        entity: String,
        field: String,
        value: String,
    },

    /// The catalog is empty or the looked-up product carries no identifier
    #[error("no products found")]
    NoProductsFound,

    /// Create was asked to reuse an identifier that is already taken
    #[error("product ID already exists")]
    IdAlreadyExists,

    /// Update payload tried to move a product to another identifier
    #[error("product ID cannot be changed")]
    IdCannotBeChanged,

    /// The repository has no store handle to work with
    #[error("database collection not initialized")]
    NotInitialized,

    /// Database operation error with operation context
    #[error("Database operation failed: {operation}")]
    Database {
        operation: String,
        #[source]
        source: anyhow::Error,
    },

    /// A store operation exceeded its time budget
    #[error("Database operation timed out after {timeout_secs}s: {operation}")]
    Timeout { operation: String, timeout_secs: u64 },

    /// Configuration error with key information
    #[error("Configuration error: {key}")]
    Configuration {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// Connection pool error
    #[error("Connection pool error")]
    ConnectionPool {
        #[source]
        source: anyhow::Error,
    },

    /// Internal error for unexpected failures
    #[error("Internal error")]
    Internal {
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    /// Builds an `InvalidArgument` error from any message.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        AppError::InvalidArgument {
            message: message.into(),
        }
    }

    /// Builds a store-level not-found error for a product lookup.
    pub fn product_not_found(product_id: &str) -> Self {
        AppError::NotFound {
            entity: "product".to_string(),
            field: "product_id".to_string(),
            value: product_id.to_string(),
        }
    }

    /// Returns the taxonomy kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::InvalidArgument { .. } | AppError::IdRequired => ErrorKind::InvalidArgument,
            AppError::Validation(_) => ErrorKind::ValidationFailed,
            AppError::NotFound { .. } | AppError::NoProductsFound => ErrorKind::NotFound,
            AppError::IdAlreadyExists | AppError::IdCannotBeChanged => ErrorKind::Conflict,
            AppError::NotInitialized => ErrorKind::NotInitialized,
            AppError::Database { .. }
            | AppError::Timeout { .. }
            | AppError::Configuration { .. }
            | AppError::ConnectionPool { .. }
            | AppError::Internal { .. } => ErrorKind::Upstream,
        }
    }

    /// True for errors meaning "nothing matched", whichever layer raised them.
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::Internal { source: error }
    }
}

impl From<diesel::result::Error> for AppError {
    fn from(error: diesel::result::Error) -> Self {
        DatabaseErrorConverter::convert_diesel_error(error, "database operation")
    }
}

impl From<crate::config::error::ConfigError> for AppError {
    fn from(error: crate::config::error::ConfigError) -> Self {
        let key = error.field().unwrap_or("configuration").to_string();
        AppError::Configuration {
            key,
            source: anyhow::Error::from(error),
        }
    }
}

/// Type alias for Result with AppError to simplify function signatures
pub type AppResult<T> = Result<T, AppError>;
