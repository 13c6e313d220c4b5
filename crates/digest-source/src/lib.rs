//! Digest Source - Hacker News API client.
//!
//! Implements [`digest_core::NewsSource`] over `reqwest`:
//!
//! - `GET {base}/topstories.json` lists the ranked candidate ids
//! - `GET {base}/item/{id}.json` returns one item, or `null` if unknown

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod client;
pub mod error;

pub use client::{HackerNewsClient, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
pub use error::{Result, SourceError};
