//! Error types for the remote store client.

use stockpile_model::ValidationError;
use thiserror::Error;

/// Result type for remote store operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Errors that can occur talking to the remote document store.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The server rejected a write because the revision token was stale:
    /// another writer updated the file concurrently. Retryable by
    /// re-reading and writing again.
    #[error("revision conflict: {message}")]
    Conflict {
        /// Server-provided description of the rejection.
        message: String,
    },

    /// Network or HTTP failure.
    #[error("transport error: {message}")]
    Transport {
        /// Error message.
        message: String,
        /// Whether the operation can be retried.
        retryable: bool,
    },

    /// Malformed JSON or backup envelope. The operation is aborted with no
    /// partial writes.
    #[error("format error: {0}")]
    Format(String),

    /// A single-item operation targeted an ID the remote store does not hold.
    #[error("item not found: {0}")]
    ItemNotFound(String),

    /// An item failed schema validation at the boundary.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl RemoteError {
    /// Creates a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Creates a retryable transport error.
    pub fn transport_retryable(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            retryable: true,
        }
    }

    /// Creates a non-retryable transport error.
    pub fn transport_fatal(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            retryable: false,
        }
    }

    /// Creates a format error.
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format(message.into())
    }

    /// Returns true if this error can be retried (by a later sync attempt
    /// or, for conflicts, by re-reading the file first).
    pub fn is_retryable(&self) -> bool {
        match self {
            RemoteError::Conflict { .. } => true,
            RemoteError::Transport { retryable, .. } => *retryable,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(RemoteError::conflict("sha mismatch").is_retryable());
        assert!(RemoteError::transport_retryable("connection reset").is_retryable());
        assert!(!RemoteError::transport_fatal("bad certificate").is_retryable());
        assert!(!RemoteError::format("not json").is_retryable());
        assert!(!RemoteError::ItemNotFound("item_1".into()).is_retryable());
    }

    #[test]
    fn error_display() {
        let err = RemoteError::conflict("expected abc, got def");
        assert_eq!(err.to_string(), "revision conflict: expected abc, got def");
    }
}
