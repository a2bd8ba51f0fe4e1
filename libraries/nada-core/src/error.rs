/// Core error types for Nada
use thiserror::Error;

use crate::types::TrackId;

/// Result type alias using `CoreError`
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error type for Nada
#[derive(Error, Debug)]
pub enum CoreError {
    /// A catalog row lacks a required field
    #[error("Catalog row is missing `{0}`")]
    MissingField(&'static str),

    /// A catalog row has no playable audio location
    #[error("Track {0} has no audio source")]
    MissingAudio(TrackId),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}
