//! Core error types for hn-digest.
//!
//! `DigestError` is what the seam traits return. Each subsystem crate keeps
//! its own richer error enum and converts into a `DigestError` variant at the
//! trait boundary.

use thiserror::Error;

/// Central error type crossing the seam traits.
#[derive(Error, Debug)]
pub enum DigestError {
    /// Configuration errors (file loading, parsing, validation)
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Store errors (connection, schema, queries, transactions)
    #[error("store error: {0}")]
    Store(String),

    /// Remote source errors (HTTP, decoding, missing items)
    #[error("source error: {0}")]
    Source(String),

    /// Notification channel errors (SMTP, chat bot API)
    #[error("notification error: {0}")]
    Notification(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to determine config directory path
    #[error("could not determine config directory (XDG base directories not available)")]
    NoConfigDir,

    /// Config file not found
    #[error("config file not found at {path}")]
    NotFound {
        /// Path where config was expected
        path: String,
    },

    /// Failed to parse TOML
    #[error("failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// I/O error reading config
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration value
    #[error("invalid config value for {field}: {reason}")]
    InvalidValue {
        /// Field name
        field: String,
        /// Reason for invalidity
        reason: String,
    },
}

impl ConfigError {
    /// Shorthand for [`ConfigError::InvalidValue`].
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias using `DigestError`.
pub type Result<T> = std::result::Result<T, DigestError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
