//! Digest run orchestration.
//!
//! This module provides [`DigestPipeline`], which takes one run from the
//! remote candidate list to a delivered digest:
//! prefetch, dedup, fetch, classify, persist, notify. Stages run strictly
//! in sequence and items are fetched one at a time.

use crate::error::{PipelineError, Result};
use crate::filter::FilterSet;
use digest_core::{
    AppConfig, DigestNotifier, FilterRule, Namespace, NewsId, NewsRecord, NewsSource,
    RunOutcome, SeenStore,
};
use digest_notify::{ConsoleNotifier, Dispatcher};
use std::collections::HashSet;
use std::sync::Arc;

/// One configured digest run.
pub struct DigestPipeline {
    /// Remote candidate source
    source: Arc<dyn NewsSource>,
    /// Seen-item store, exclusively used by this run
    store: Arc<dyn SeenStore>,
    /// Notification channels in priority order
    dispatcher: Dispatcher,
    /// Configured filters, flattened at run time
    filters: Vec<FilterRule>,
    /// Hosts excluded from the digest
    blacklist: Vec<String>,
    /// Reverse-filter mode
    reverse: bool,
}

impl DigestPipeline {
    /// Create a normal-mode pipeline without a blacklist.
    #[must_use]
    pub fn new(
        source: Arc<dyn NewsSource>,
        store: Arc<dyn SeenStore>,
        dispatcher: Dispatcher,
        filters: Vec<FilterRule>,
    ) -> Self {
        Self {
            source,
            store,
            dispatcher,
            filters,
            blacklist: Vec::new(),
            reverse: false,
        }
    }

    /// Create a pipeline from application configuration.
    ///
    /// Reverse mode is on when either `reverse` or `reverse_filters` is set.
    #[must_use]
    pub fn from_config(
        config: &AppConfig,
        reverse: bool,
        source: Arc<dyn NewsSource>,
        store: Arc<dyn SeenStore>,
        dispatcher: Dispatcher,
    ) -> Self {
        Self::new(source, store, dispatcher, config.filters.clone())
            .with_blacklist(config.blacklist.clone())
            .with_reverse(reverse || config.reverse_filters)
    }

    /// Set the host blacklist.
    #[must_use]
    pub fn with_blacklist(mut self, blacklist: Vec<String>) -> Self {
        self.blacklist = blacklist;
        self
    }

    /// Set reverse-filter mode.
    #[must_use]
    pub fn with_reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    /// Store namespace this run reads and writes.
    #[must_use]
    pub fn namespace(&self) -> Namespace {
        Namespace::for_run(self.reverse)
    }

    /// Execute one run.
    ///
    /// The store is closed before returning, whatever the outcome.
    ///
    /// # Errors
    /// Returns the first fatal failure. A per-item fetch failure is not
    /// fatal; the item stays unseen and is retried next run.
    pub async fn run(&self) -> Result<RunOutcome> {
        let filters = FilterSet::new(&self.filters, &self.blacklist)?;
        let namespace = self.namespace();

        tracing::info!(
            namespace = %namespace,
            filters = filters.len(),
            "starting digest run"
        );

        if let Err(e) = self.store.initialize(namespace).await {
            tracing::error!("store initialization failed: {e}");
            self.store.close().await;
            return Err(PipelineError::StoreUnavailable(e));
        }

        let result = self.execute(&filters, namespace).await;
        self.store.close().await;

        match &result {
            Ok(outcome) => tracing::info!(
                matched = outcome.matched_count,
                "digest run finished"
            ),
            Err(e) => tracing::error!("digest run failed: {e}"),
        }
        result
    }

    async fn execute(&self, filters: &FilterSet, namespace: Namespace) -> Result<RunOutcome> {
        let candidates = dedup_preserving_order(
            self.source
                .top_story_ids()
                .await
                .map_err(PipelineError::Prefetch)?,
        );

        let unseen = self
            .store
            .unseen_among(namespace, &candidates)
            .await
            .map_err(PipelineError::Lookup)?;
        tracing::info!(
            candidates = candidates.len(),
            unseen = unseen.len(),
            "candidates prefetched"
        );

        let fetched_at = chrono::Utc::now().timestamp();
        let mut batch: Vec<NewsRecord> = Vec::with_capacity(unseen.len());
        let mut digest: Vec<NewsRecord> = Vec::new();

        for id in unseen {
            let item = match self.source.fetch_item(id).await {
                Ok(item) => item,
                Err(e) => {
                    tracing::warn!(%id, "skipping item, will retry next run: {e}");
                    continue;
                }
            };

            let record = NewsRecord::from_source_item(item, fetched_at);
            if filters.classify(&record, self.reverse) {
                tracing::debug!(%id, title = %record.title, "item matched");
                digest.push(record.clone());
            }
            batch.push(record);
        }

        self.store
            .record_all(namespace, &batch)
            .await
            .map_err(PipelineError::Persist)?;
        tracing::info!(persisted = batch.len(), matched = digest.len(), "items persisted");

        if !digest.is_empty() {
            let notifier: Arc<dyn DigestNotifier> = match self.dispatcher.select() {
                Some(notifier) => Arc::clone(notifier),
                None => Arc::new(ConsoleNotifier::new()),
            };
            notifier
                .send_digest(&digest)
                .await
                .map_err(|source| PipelineError::Notification {
                    channel: notifier.channel(),
                    matched_count: digest.len(),
                    source,
                })?;
        }

        Ok(RunOutcome {
            filter_count: filters.len(),
            matched_count: digest.len(),
        })
    }
}

/// Maintenance path: open the store (which purges aged records) and close it.
///
/// Touches neither the remote source nor any notification channel.
///
/// # Errors
/// Returns `PipelineError::StoreUnavailable` if initialization fails.
pub async fn run_vacuum(store: &dyn SeenStore, namespace: Namespace) -> Result<()> {
    let result = store.initialize(namespace).await;
    store.close().await;
    result.map_err(PipelineError::StoreUnavailable)?;
    tracing::info!(namespace = %namespace, "maintenance finished");
    Ok(())
}

fn dedup_preserving_order(ids: Vec<NewsId>) -> Vec<NewsId> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}
