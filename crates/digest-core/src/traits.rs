//! Seams between the digest pipeline and its collaborators.
//!
//! The pipeline only ever talks to these traits; HTTP, SQL and delivery
//! details stay in the crates that implement them.

use crate::error::Result;
use crate::types::{Namespace, NewsId, NewsRecord, SourceItem};
use async_trait::async_trait;

/// Remote ranking API that produces candidate items.
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// List the current ranked candidate ids.
    async fn top_story_ids(&self) -> Result<Vec<NewsId>>;

    /// Fetch the full record for one id.
    async fn fetch_item(&self, id: NewsId) -> Result<SourceItem>;
}

/// Durable record of which items were already ingested.
///
/// Every operation is scoped to a [`Namespace`]. Implementations assume
/// serialized access: one run at a time against the same backing store.
#[async_trait]
pub trait SeenStore: Send + Sync {
    /// Create the namespace's schema if absent, then purge records older
    /// than the configured retention. Idempotent.
    async fn initialize(&self, namespace: Namespace) -> Result<()>;

    /// Return the ids from `ids` not yet recorded in `namespace`, in input order.
    ///
    /// An empty input yields an empty output.
    async fn unseen_among(&self, namespace: Namespace, ids: &[NewsId]) -> Result<Vec<NewsId>>;

    /// Append all records to `namespace`. Either every record is stored or none is.
    async fn record_all(&self, namespace: Namespace, records: &[NewsRecord]) -> Result<()>;

    /// Release the underlying connections.
    async fn close(&self);
}

/// One delivery channel for a finished digest.
#[async_trait]
pub trait DigestNotifier: Send + Sync {
    /// Short channel name used in logs and errors (`telegram`, `email`, `console`).
    fn channel(&self) -> &'static str;

    /// Deliver every digest item to the channel's destination.
    async fn send_digest(&self, digest: &[NewsRecord]) -> Result<()>;
}
