//! Digest Core - Foundation crate for hn-digest.
//!
//! This crate provides the shared data model, error taxonomy, configuration
//! loading and the seam traits that every other hn-digest crate builds on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with environment overrides
//! - [`types`] - Shared newtypes and records (`NewsId`, `NewsRecord`, `Namespace`)
//! - [`traits`] - Seams consumed by the pipeline (`NewsSource`, `SeenStore`, `DigestNotifier`)
//!
//! # Example
//!
//! ```rust
//! use digest_core::{AppConfig, FilterRule};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut config = AppConfig::default();
//! config.filters.push(FilterRule::new("SQL", "sql,postgres"));
//! config.validate()?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use config::{AppConfig, DatabaseConfig, SmtpConfig, TelegramConfig};
pub use error::{ConfigError, ConfigResult, DigestError, Result};
pub use traits::{DigestNotifier, NewsSource, SeenStore};
pub use types::{FilterRule, Namespace, NewsId, NewsRecord, RunOutcome, SourceItem};
