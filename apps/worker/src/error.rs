//! Error handling for the Cadence worker
//!
//! A unified error type for queue consumption and job execution, built with
//! thiserror. Mood engine failures arrive as [`StorageError`] and keep their
//! own retryability.

use cadence_mood_engine::StorageError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main worker error type
#[derive(Error, Debug)]
pub enum WorkerError {
    // ========== Job Processing Errors ==========
    /// Invalid job payload (missing or malformed fields)
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// Job timed out during execution
    #[error("job timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    // ========== Database Errors ==========
    /// Database query failed
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration failed at startup
    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    // ========== Redis/Queue Errors ==========
    /// Redis operation failed
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Queue operation failed
    #[error("queue error: {0}")]
    Queue(String),

    /// Failed to deserialize job from queue
    #[error("job deserialization failed: {0}")]
    JobDeserialization(#[from] serde_json::Error),

    // ========== Mood Engine Errors ==========
    /// Catalog or mood store call failed inside the engine
    #[error("mood engine storage error: {0}")]
    Storage(#[from] StorageError),

    // ========== Configuration Errors ==========
    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),

}

impl WorkerError {
    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Storage(err) => err.is_retryable(),
            Self::Database(_) | Self::Redis(_) | Self::Queue(_) | Self::Timeout { .. } => true,
            _ => false,
        }
    }

    /// Get a severity level for logging
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // Critical errors that should alert operators
            Self::Configuration(_) | Self::Migration(_) => ErrorSeverity::Critical,

            // Errors that indicate service issues
            Self::Database(_) | Self::Redis(_) => ErrorSeverity::Error,
            Self::Storage(StorageError::Corrupt { .. }) => ErrorSeverity::Error,
            Self::Storage(StorageError::Backend { .. }) => ErrorSeverity::Error,

            // Warnings for expected failures
            Self::Timeout { .. } | Self::Queue(_) => ErrorSeverity::Warning,
            Self::Storage(StorageError::Timeout { .. }) => ErrorSeverity::Warning,

            // Info level for normal processing issues
            Self::InvalidPayload(_) | Self::JobDeserialization(_) => ErrorSeverity::Info,
        }
    }

    /// Subsystem the error originated from
    pub fn component(&self) -> &'static str {
        match self {
            Self::Storage(_) => "mood_engine",
            Self::Database(_) | Self::Migration(_) => "postgres",
            Self::Redis(_) | Self::Queue(_) | Self::JobDeserialization(_) => "queue",
            Self::Configuration(_) => "config",
            _ => "worker",
        }
    }

    /// Log the error with appropriate severity
    pub fn log(&self) {
        let context = self.component();
        match self.severity() {
            ErrorSeverity::Critical => {
                tracing::error!(
                    error = %self,
                    context = context,
                    retryable = self.is_retryable(),
                    "Critical worker error"
                );
            }
            ErrorSeverity::Error => {
                tracing::error!(
                    error = %self,
                    context = context,
                    retryable = self.is_retryable(),
                    "Worker error"
                );
            }
            ErrorSeverity::Warning => {
                tracing::warn!(
                    error = %self,
                    context = context,
                    retryable = self.is_retryable(),
                    "Worker warning"
                );
            }
            ErrorSeverity::Info => {
                tracing::info!(
                    error = %self,
                    context = context,
                    retryable = self.is_retryable(),
                    "Worker info"
                );
            }
        }
    }
}

/// Error severity levels for logging and alerting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Critical errors that should trigger alerts
    Critical,
    /// Standard errors
    Error,
    /// Warnings for expected failures
    Warning,
    /// Informational messages
    Info,
}

/// Result type alias for worker operations
pub type WorkerResult<T> = Result<T, WorkerError>;

/// Outcome of one processed job, logged after execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResult {
    /// Job type name
    pub job: String,
    /// Whether the job succeeded
    pub success: bool,
    /// Error message if failed
    pub error_message: Option<String>,
    /// Whether the job can be retried
    pub retryable: bool,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl JobResult {
    /// Create a successful job result
    pub fn success(job: &str, duration_ms: u64) -> Self {
        Self {
            job: job.to_string(),
            success: true,
            error_message: None,
            retryable: false,
            duration_ms,
        }
    }

    /// Create a failed job result from an error
    pub fn from_error(job: &str, err: &WorkerError, duration_ms: u64) -> Self {
        Self {
            job: job.to_string(),
            success: false,
            error_message: Some(err.to_string()),
            retryable: err.is_retryable(),
            duration_ms,
        }
    }
}
