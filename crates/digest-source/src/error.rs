//! Error types for the remote source.

use digest_core::{DigestError, NewsId};
use thiserror::Error;

/// Errors that can occur while talking to the Hacker News API.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Non-success HTTP status
    #[error("API error: status {status} from {url}")]
    ApiError {
        /// Requested URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// The API returned `null` for an item
    #[error("item {0} not found")]
    NotFound(NewsId),

    /// Body could not be decoded
    #[error("failed to parse response from {url}: {message}")]
    ParseError {
        /// Requested URL
        url: String,
        /// Decoder message
        message: String,
    },

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias for source operations.
pub type Result<T> = std::result::Result<T, SourceError>;

impl From<SourceError> for DigestError {
    fn from(err: SourceError) -> Self {
        DigestError::Source(err.to_string())
    }
}
