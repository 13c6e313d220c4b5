pub mod error;
pub mod sender;
pub mod templates;

pub use error::{MailError, Result};
pub use sender::SmtpSender;
pub use templates::{escape_html, render_digest, DigestEmail};
