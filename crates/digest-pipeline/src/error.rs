//! Pipeline error types.
//!
//! Each variant names the stage that failed, so the caller can tell a
//! broken store apart from an unreachable API or a failed delivery.

use digest_core::DigestError;
use thiserror::Error;

/// Fatal outcome of a digest run.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// No usable filter pattern is configured
    #[error("no filters configured")]
    NoFilters,

    /// Store could not be opened or initialized
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[source] DigestError),

    /// Candidate list could not be retrieved
    #[error("failed to prefetch candidate ids: {0}")]
    Prefetch(#[source] DigestError),

    /// Seen-set lookup failed
    #[error("seen-set lookup failed: {0}")]
    Lookup(#[source] DigestError),

    /// Bulk insert failed; nothing from this run was recorded
    #[error("failed to persist fetched items: {0}")]
    Persist(#[source] DigestError),

    /// Delivery failed after the run's items were persisted
    #[error("{channel} notification failed for {matched_count} item(s): {source}")]
    Notification {
        /// Channel that was selected
        channel: &'static str,
        /// Size of the undelivered digest
        matched_count: usize,
        /// Underlying error
        source: DigestError,
    },
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
