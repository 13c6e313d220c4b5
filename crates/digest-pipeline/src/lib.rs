//! Digest Pipeline - the core of hn-digest.
//!
//! Composes a [`digest_core::NewsSource`], a [`digest_core::SeenStore`] and a
//! [`digest_notify::Dispatcher`] into a single run:
//!
//! 1. flatten the configured filters (fail fast when none remain)
//! 2. initialize the store namespace, purging aged records
//! 3. prefetch the ranked candidate ids
//! 4. keep only ids not yet seen in the namespace
//! 5. fetch each unseen item, skipping per-item failures
//! 6. classify every fetched record
//! 7. persist all fetched records in one batch
//! 8. deliver a non-empty digest through exactly one channel
//! 9. close the store and report the outcome
//!
//! [`run_vacuum`] performs only step 2.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod error;
pub mod filter;
pub mod orchestrator;

pub use error::{PipelineError, Result};
pub use filter::FilterSet;
pub use orchestrator::{run_vacuum, DigestPipeline};
