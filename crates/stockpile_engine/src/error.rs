//! Engine error types.

use stockpile_model::ValidationError;
use stockpile_remote::RemoteError;
use thiserror::Error;

/// Result alias for engine operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors from local persistence.
#[derive(Debug, Error)]
pub enum LocalError {
    /// Filesystem failure while reading or writing a state file.
    #[error("local store i/o: {0}")]
    Io(#[from] std::io::Error),

    /// State could not be serialized for persistence.
    #[error("local store serialization: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors from the sync engine and inventory service.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The remote store rejected or failed an operation.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// Local persistence failed.
    #[error(transparent)]
    Local(#[from] LocalError),

    /// Item input failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The referenced item does not exist in the collection.
    #[error("unknown item: {0}")]
    UnknownItem(String),
}

impl SyncError {
    /// Returns true if the failure is transient and the queued work can be
    /// retried on the next sync attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Remote(e) => e.is_retryable(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_retryability_passes_through() {
        let err = SyncError::from(RemoteError::transport_retryable("timeout"));
        assert!(err.is_retryable());

        let err = SyncError::UnknownItem("item_1".into());
        assert!(!err.is_retryable());
    }

    #[test]
    fn unknown_item_message_names_the_id() {
        let err = SyncError::UnknownItem("local_7".into());
        assert_eq!(err.to_string(), "unknown item: local_7");
    }
}
