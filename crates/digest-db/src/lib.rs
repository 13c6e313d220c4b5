//! Digest Database Layer
//!
//! Durable seen-item store for hn-digest, backed by SQLite or MySQL through
//! the `SQLx` `Any` driver.
//!
//! # Architecture
//!
//! - **Namespaces**: normal and reverse runs each get their own table
//!   (`news_items`, `reverse_news_items`) so one policy never hides an item
//!   from the other
//! - **Dialects**: statement templates are resolved once per store when it is
//!   opened, never through global state
//! - **Retention**: `initialize` purges rows older than the configured number
//!   of days and compacts SQLite files afterwards
//!
//! # Example
//!
//! ```ignore
//! use digest_core::{DatabaseConfig, Namespace, SeenStore};
//! use digest_db::SqlStore;
//!
//! let store = SqlStore::connect(&DatabaseConfig::default(), 30)?;
//! store.initialize(Namespace::Normal).await?;
//! let fresh = store.unseen_among(Namespace::Normal, &ids).await?;
//! store.close().await;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod connection;
pub mod dialect;
pub mod error;
pub mod seen_items;

// Re-export commonly used types
pub use connection::{StorePool, MEMORY_DATABASE};
pub use dialect::{Dialect, Statements};
pub use error::{DatabaseError, Result};

use async_trait::async_trait;
use digest_core::{DatabaseConfig, Namespace, NewsId, NewsRecord, SeenStore};

const SECONDS_PER_DAY: i64 = 86_400;

/// SQL implementation of [`SeenStore`].
#[derive(Debug, Clone)]
pub struct SqlStore {
    pool: StorePool,
    purge_after_days: u32,
    normal: Statements,
    reverse: Statements,
}

impl SqlStore {
    /// Open a store for the configured backend.
    ///
    /// The connection itself is lazy; the first real query happens in
    /// [`SeenStore::initialize`].
    ///
    /// # Arguments
    /// * `config` - Backend driver and connection parameters
    /// * `purge_after_days` - Retention horizon; `0` disables purging
    pub fn connect(config: &DatabaseConfig, purge_after_days: u32) -> Result<Self> {
        let pool = StorePool::connect(config)?;
        let dialect = pool.dialect();
        Ok(Self {
            pool,
            purge_after_days,
            normal: dialect.statements(Namespace::Normal),
            reverse: dialect.statements(Namespace::Reverse),
        })
    }

    /// Statements bound to a namespace.
    #[must_use]
    pub fn statements(&self, namespace: Namespace) -> &Statements {
        match namespace {
            Namespace::Normal => &self.normal,
            Namespace::Reverse => &self.reverse,
        }
    }

    /// Access the underlying pool.
    #[must_use]
    pub fn pool(&self) -> &StorePool {
        &self.pool
    }

    /// Delete records older than `days` days and compact storage.
    ///
    /// Returns the number of deleted rows.
    pub async fn purge(&self, namespace: Namespace, days: u32) -> Result<u64> {
        let cutoff = chrono::Utc::now().timestamp() - i64::from(days) * SECONDS_PER_DAY;
        let stmts = self.statements(namespace);
        let deleted = seen_items::purge_older_than(self.pool.pool(), stmts, cutoff).await?;
        tracing::info!(
            namespace = %namespace,
            deleted,
            days,
            "purged old records"
        );
        Ok(deleted)
    }

    /// Number of records in a namespace.
    pub async fn count(&self, namespace: Namespace) -> Result<i64> {
        seen_items::count(self.pool.pool(), self.statements(namespace)).await
    }

    async fn prepare(&self, namespace: Namespace) -> Result<()> {
        seen_items::create_table(self.pool.pool(), self.statements(namespace)).await?;
        if self.purge_after_days > 0 {
            self.purge(namespace, self.purge_after_days).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl SeenStore for SqlStore {
    async fn initialize(&self, namespace: Namespace) -> digest_core::Result<()> {
        self.prepare(namespace).await?;
        tracing::debug!(namespace = %namespace, "store initialized");
        Ok(())
    }

    async fn unseen_among(
        &self,
        namespace: Namespace,
        ids: &[NewsId],
    ) -> digest_core::Result<Vec<NewsId>> {
        let unseen =
            seen_items::unseen_among(self.pool.pool(), self.statements(namespace), ids).await?;
        Ok(unseen)
    }

    async fn record_all(
        &self,
        namespace: Namespace,
        records: &[NewsRecord],
    ) -> digest_core::Result<()> {
        seen_items::record_all(self.pool.pool(), self.statements(namespace), records).await?;
        tracing::debug!(namespace = %namespace, count = records.len(), "records persisted");
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
