//! Digest Notify - delivery channels for a finished digest.
//!
//! Each channel implements [`digest_core::DigestNotifier`]. The
//! [`Dispatcher`] resolves the candidates once per run in fixed priority
//! order (Telegram, email, console) and only ever uses the first.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod console;
pub mod dispatcher;
pub mod email;
pub mod error;
pub mod telegram;

pub use console::ConsoleNotifier;
pub use dispatcher::Dispatcher;
pub use email::EmailNotifier;
pub use error::{NotifyError, Result};
pub use telegram::TelegramNotifier;
