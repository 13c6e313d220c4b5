//! Per-backend SQL statement templates.
//!
//! A [`Dialect`] is picked once when the store is opened and turned into an
//! immutable [`Statements`] set per namespace. Nothing here is global.

use crate::error::{DatabaseError, Result};
use digest_core::Namespace;

/// Maximum number of ids bound into a single `IN (...)` lookup.
pub const LOOKUP_CHUNK: usize = 500;

/// SQL flavour of the configured backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// SQLite file or in-memory database
    Sqlite,
    /// MySQL / MariaDB server
    MySql,
}

impl Dialect {
    /// Map a configured driver name to its dialect.
    ///
    /// # Errors
    /// Returns `DatabaseError::UnsupportedDriver` for anything but `sqlite` and `mysql`.
    pub fn from_driver(driver: &str) -> Result<Self> {
        match driver {
            "sqlite" => Ok(Self::Sqlite),
            "mysql" => Ok(Self::MySql),
            other => Err(DatabaseError::UnsupportedDriver(other.to_string())),
        }
    }

    /// Build the statement set for one namespace.
    #[must_use]
    pub fn statements(self, namespace: Namespace) -> Statements {
        let table = table_name(namespace);

        let create_table = match self {
            Self::Sqlite => format!(
                "CREATE TABLE IF NOT EXISTS {table} (
                    id INTEGER PRIMARY KEY,
                    created_at INTEGER NOT NULL,
                    news_title TEXT NOT NULL,
                    news_url TEXT NOT NULL
                )"
            ),
            Self::MySql => format!(
                "CREATE TABLE IF NOT EXISTS {table} (
                    id BIGINT PRIMARY KEY,
                    created_at BIGINT NOT NULL,
                    news_title TEXT NOT NULL,
                    news_url TEXT NOT NULL
                ) DEFAULT CHARSET = utf8mb4"
            ),
        };

        let vacuum = match self {
            Self::Sqlite => Some("VACUUM"),
            Self::MySql => None,
        };

        Statements {
            table,
            create_table,
            insert: format!(
                "INSERT INTO {table} (id, created_at, news_title, news_url) VALUES (?, ?, ?, ?)"
            ),
            purge: format!("DELETE FROM {table} WHERE created_at < ?"),
            count: format!("SELECT COUNT(*) FROM {table}"),
            vacuum,
        }
    }
}

/// Table backing each namespace.
#[must_use]
pub fn table_name(namespace: Namespace) -> &'static str {
    match namespace {
        Namespace::Normal => "news_items",
        Namespace::Reverse => "reverse_news_items",
    }
}

/// Immutable statement set bound to one namespace of one store.
#[derive(Debug, Clone)]
pub struct Statements {
    /// Table name
    pub table: &'static str,
    /// Idempotent schema creation
    pub create_table: String,
    /// Single-row insert with four positional parameters
    pub insert: String,
    /// Delete rows with `created_at` below the bound cutoff
    pub purge: String,
    /// Row count
    pub count: String,
    /// Storage compaction after a purge, if the backend needs one
    pub vacuum: Option<&'static str>,
}

impl Statements {
    /// Lookup of already-recorded ids among `n` bound candidates.
    #[must_use]
    pub fn select_existing(&self, n: usize) -> String {
        let placeholders = vec!["?"; n.max(1)].join(", ");
        format!(
            "SELECT id FROM {} WHERE id IN ({placeholders})",
            self.table
        )
    }
}
