//! Configuration error types

use thiserror::Error;

/// Failures while loading or validating catalog-rs configuration.
///
/// Startup aborts on any of these; the message is printed as-is.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `default.toml` or the file selected with `--config` is missing
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// The merged sources do not deserialize into `Settings`
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// A setting holds a value the service cannot run with
    #[error("Validation error: {field} - {message}")]
    ValidationError {
        /// Dotted key of the offending setting, e.g. `database.url`
        field: String,
        message: String,
    },

    /// `CATALOG_APP_ENV` names an unknown environment
    #[error("Environment variable error: {0}")]
    EnvVarError(String),

    /// `CATALOG_CONFIG_DIR` and `CATALOG_CONFIG_FILE` were both set
    #[error("Mutual exclusivity error: {0}")]
    MutualExclusivityError(String),

    #[error("Configuration error: {0}")]
    Other(#[from] config::ConfigError),
}

impl ConfigError {
    /// Create a validation error for the setting at `field` (dotted key).
    pub fn validation<S: Into<String>>(field: S, message: S) -> Self {
        ConfigError::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a missing-file error; `path` is included in the message.
    pub fn file_not_found<S: Into<String>>(path: S) -> Self {
        ConfigError::FileNotFound(path.into())
    }

    /// Create an error for two configuration selectors given together.
    pub fn mutual_exclusivity<S: Into<String>>(message: S) -> Self {
        ConfigError::MutualExclusivityError(message.into())
    }

    /// Dotted key of the offending setting, for validation errors.
    pub fn field(&self) -> Option<&str> {
        match self {
            ConfigError::ValidationError { field, .. } => Some(field),
            _ => None,
        }
    }
}
