//! Error types for the mood engine
//!
//! Missing songs, genres, preferences and sessions are not errors: they are
//! replaced by defaults where they occur. What is left is storage failure,
//! which is always propagated to the caller instead of being papered over,
//! since a silently defaulted mood would skew every later recommendation.

use std::error::Error as StdError;

use thiserror::Error;

/// Boxed source error from a storage backend
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Failure of a catalog, candidate source or mood store call
#[derive(Error, Debug)]
pub enum StorageError {
    /// The backend rejected or failed the operation
    #[error("{operation} failed: {source}")]
    Backend {
        operation: &'static str,
        #[source]
        source: BoxError,
    },

    /// The operation did not finish within the configured deadline
    #[error("{operation} timed out after {millis}ms")]
    Timeout { operation: &'static str, millis: u64 },

    /// A stored row could not be mapped back into a domain value
    #[error("corrupt {entity} record: {reason}")]
    Corrupt { entity: &'static str, reason: String },
}

impl StorageError {
    /// Wrap a backend error with the operation that produced it
    pub fn backend(operation: &'static str, source: impl Into<BoxError>) -> Self {
        Self::Backend {
            operation,
            source: source.into(),
        }
    }

    /// Create a corrupt-record error
    pub fn corrupt(entity: &'static str, reason: impl Into<String>) -> Self {
        Self::Corrupt {
            entity,
            reason: reason.into(),
        }
    }

    /// Name of the failed operation, when known
    pub fn operation(&self) -> Option<&'static str> {
        match self {
            Self::Backend { operation, .. } | Self::Timeout { operation, .. } => Some(operation),
            Self::Corrupt { .. } => None,
        }
    }

    /// Whether repeating the call could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Backend { .. } | Self::Timeout { .. })
    }
}

/// Result type alias for mood engine operations
pub type StorageResult<T> = Result<T, StorageError>;
