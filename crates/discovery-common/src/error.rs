//! Error types for the discovery store
//!
//! Conflict-resolution losses and concurrent-modification retries are not
//! errors; they surface as `false` returns from the store operations. This
//! enum covers the conditions a caller actually has to handle.

/// Application-specific error types
#[derive(thiserror::Error, Debug)]
pub enum DiscoveryError {
    #[error("caused: {0}")]
    IllegalArgument(String),

    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl DiscoveryError {
    pub fn illegal_argument(message: impl Into<String>) -> Self {
        DiscoveryError::IllegalArgument(message.into())
    }
}

pub type Result<T> = std::result::Result<T, DiscoveryError>;
