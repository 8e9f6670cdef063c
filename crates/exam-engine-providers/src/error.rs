//! Provider error types.

use thiserror::Error;

/// Errors that can occur when talking to a question bank, extractor, or
/// sync backend.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The uploaded document is not something the extractor can read.
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    /// The requested exam does not exist in the backend.
    #[error("not found: {0}")]
    NotFound(String),

    /// A different exam is already stored under the same key.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The sync backend has not been configured or was disconnected.
    #[error("sync backend not connected: {0}")]
    NotConnected(String),

    /// The backend failed to read or write its storage.
    #[error("storage error: {0}")]
    Storage(String),
}

impl ProviderError {
    /// Returns `true` if this error is permanent and should not be retried.
    pub fn is_permanent(&self) -> bool {
        !matches!(self, ProviderError::Storage(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permanence() {
        assert!(ProviderError::NotFound("x".into()).is_permanent());
        assert!(ProviderError::InvalidDocument("x".into()).is_permanent());
        assert!(ProviderError::Conflict("x".into()).is_permanent());
        assert!(!ProviderError::Storage("disk full".into()).is_permanent());
    }
}
