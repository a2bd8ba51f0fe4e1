//! Error types for the store layer

use thiserror::Error;

/// Errors raised by a [`KeyValueStore`](crate::KeyValueStore)
///
/// The session never propagates these; it logs them and carries on.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Key cannot be mapped onto the backend
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backend reported a failure of its own
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;
