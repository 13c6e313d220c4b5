use digest_core::DigestError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("bad {field} address: {message}")]
    InvalidAddress { field: &'static str, message: String },

    #[error("failed to build message: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

pub type Result<T> = std::result::Result<T, MailError>;

impl From<MailError> for DigestError {
    fn from(err: MailError) -> Self {
        DigestError::Notification(err.to_string())
    }
}
