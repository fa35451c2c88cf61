use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SubplayError>;

#[derive(Debug, Error)]
pub enum SubplayError {
    #[error("Failed to fetch subtitle document from '{location}': {reason}")]
    Fetch { location: String, reason: String },

    #[error("Subtitle track '{0}' has neither inline content nor a source location")]
    MissingSource(String),

    #[error("Unsupported playback rate: {0} (expected one of 0.5, 1, 1.5, 2)")]
    InvalidPlaybackRate(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}
