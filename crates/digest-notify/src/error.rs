//! Error types for notification channels.

use digest_core::{DigestError, NewsId};
use digest_mail::MailError;
use thiserror::Error;

/// Errors raised while delivering a digest.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// Bot API rejected a message
    #[error("telegram API error: status {status}, {message}")]
    Telegram {
        /// HTTP status code
        status: u16,
        /// Description returned by the API
        message: String,
    },

    /// Some digest items were not delivered
    #[error("telegram delivery failed for {} of {total} item(s) ({}): {first_error}", .failed.len(), join_ids(.failed))]
    TelegramPartial {
        /// Items the API rejected or that could not be sent
        failed: Vec<NewsId>,
        /// Size of the digest
        total: usize,
        /// First failure, for context
        first_error: Box<NotifyError>,
    },

    /// Chat id is not an integer
    #[error("invalid telegram chat id {0:?}")]
    InvalidChatId(String),

    /// Email composition or SMTP failure
    #[error(transparent)]
    Mail(#[from] MailError),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

fn join_ids(ids: &[NewsId]) -> String {
    ids.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

/// Result type alias for notification operations.
pub type Result<T> = std::result::Result<T, NotifyError>;

impl From<NotifyError> for DigestError {
    fn from(err: NotifyError) -> Self {
        DigestError::Notification(err.to_string())
    }
}
