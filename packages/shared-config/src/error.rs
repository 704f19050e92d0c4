//! Configuration error types

use thiserror::Error;

/// Errors raised while reading service configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Missing required environment variable
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// Environment variable present but not parseable
    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),

    /// Values parse individually but are inconsistent together
    #[error("configuration validation failed: {0}")]
    ValidationError(String),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
