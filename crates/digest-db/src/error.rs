//! Database error types.
//!
//! Provides error handling for store operations using `thiserror`.

use digest_core::DigestError;
use thiserror::Error;

/// Database-specific errors.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to build a connection target from configuration.
    #[error("failed to open database: {0}")]
    Open(String),

    /// Configured driver is not one the store knows statements for.
    #[error("unsupported database driver: {0}")]
    UnsupportedDriver(String),

    /// Schema creation failed.
    #[error("schema setup failed: {0}")]
    Schema(String),

    /// Retention purge failed.
    #[error("purge failed: {0}")]
    Purge(String),

    /// Bulk insert failed and was rolled back.
    #[error("insert failed, nothing was recorded: {0}")]
    Insert(String),

    /// Underlying `SQLx` error.
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

/// Result type alias for database operations.
pub type Result<T> = std::result::Result<T, DatabaseError>;

impl From<DatabaseError> for DigestError {
    fn from(err: DatabaseError) -> Self {
        DigestError::Store(err.to_string())
    }
}
