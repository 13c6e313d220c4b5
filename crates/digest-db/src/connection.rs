//! Connection management for the seen-item store.
//!
//! Provides a `StorePool` wrapper around the `SQLx` `Any` driver so that the
//! same code path serves SQLite files, SQLite in-memory databases and MySQL.

use crate::dialect::Dialect;
use crate::error::{DatabaseError, Result};
use digest_core::DatabaseConfig;
use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;

/// In-memory SQLite marker accepted in the `database` field.
pub const MEMORY_DATABASE: &str = ":memory:";

/// Lazily connected pool plus the dialect it speaks.
///
/// No connection is opened until the first query, so building a `StorePool`
/// never touches the network or the filesystem.
#[derive(Debug, Clone)]
pub struct StorePool {
    pool: AnyPool,
    dialect: Dialect,
}

impl StorePool {
    /// Build a pool for the configured backend.
    ///
    /// # Errors
    /// Returns `DatabaseError` if the driver is unknown or the connection
    /// target cannot be parsed.
    pub fn connect(config: &DatabaseConfig) -> Result<Self> {
        sqlx::any::install_default_drivers();

        let dialect = Dialect::from_driver(&config.driver)?;
        let url = connection_url(dialect, config)?;

        // A single long-lived connection keeps in-memory databases alive for
        // the whole run and serializes access to the store.
        let pool = AnyPoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_lazy(&url)
            .map_err(|e| DatabaseError::Open(format!("invalid connection target: {e}")))?;

        tracing::debug!(driver = %config.driver, "store pool created");

        Ok(Self { pool, dialect })
    }

    /// Get a reference to the underlying `SQLx` pool.
    #[must_use]
    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    /// Dialect of the connected backend.
    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Close the pool gracefully. Safe to call more than once.
    pub async fn close(&self) {
        if !self.pool.is_closed() {
            self.pool.close().await;
            tracing::debug!("store pool closed");
        }
    }

    /// Check the backend is reachable.
    pub async fn verify(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Build the `SQLx` connection URL for a database config.
///
/// # Errors
/// Returns `DatabaseError::Open` when required parts are missing.
pub fn connection_url(dialect: Dialect, config: &DatabaseConfig) -> Result<String> {
    if config.database.is_empty() {
        return Err(DatabaseError::Open("database name is empty".to_string()));
    }

    match dialect {
        Dialect::Sqlite => {
            if config.database == MEMORY_DATABASE {
                Ok("sqlite::memory:".to_string())
            } else {
                Ok(format!("sqlite://{}?mode=rwc", config.database))
            }
        }
        Dialect::MySql => {
            if config.address.is_empty() {
                return Err(DatabaseError::Open(
                    "mysql requires a server address".to_string(),
                ));
            }
            let credentials = if config.username.is_empty() {
                String::new()
            } else if config.password.is_empty() {
                format!("{}@", urlencoding::encode(&config.username))
            } else {
                format!(
                    "{}:{}@",
                    urlencoding::encode(&config.username),
                    urlencoding::encode(&config.password)
                )
            };
            Ok(format!(
                "mysql://{credentials}{}/{}",
                config.address,
                urlencoding::encode(&config.database)
            ))
        }
    }
}
