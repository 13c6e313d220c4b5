//! Seen-item queries.
//!
//! Free functions over an `AnyPool` and a namespace's [`Statements`]. The
//! store type in the crate root wires them to the `SeenStore` trait.

use crate::dialect::{Statements, LOOKUP_CHUNK};
use crate::error::{DatabaseError, Result};
use digest_core::{NewsId, NewsRecord};
use sqlx::{Any, AnyPool};
use std::collections::HashSet;

/// Create the namespace table if it does not exist.
pub async fn create_table(pool: &AnyPool, stmts: &Statements) -> Result<()> {
    sqlx::query(&stmts.create_table)
        .execute(pool)
        .await
        .map_err(|e| DatabaseError::Schema(format!("{}: {e}", stmts.table)))?;
    Ok(())
}

/// Return the ids not yet recorded, preserving input order.
pub async fn unseen_among(
    pool: &AnyPool,
    stmts: &Statements,
    ids: &[NewsId],
) -> Result<Vec<NewsId>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut seen: HashSet<i64> = HashSet::new();
    for chunk in ids.chunks(LOOKUP_CHUNK) {
        let sql = stmts.select_existing(chunk.len());
        let mut query = sqlx::query_scalar::<Any, i64>(&sql);
        for id in chunk {
            query = query.bind(id.get());
        }
        seen.extend(query.fetch_all(pool).await?);
    }

    Ok(ids
        .iter()
        .copied()
        .filter(|id| !seen.contains(&id.get()))
        .collect())
}

/// Insert every record in one transaction.
///
/// On any failure the transaction is rolled back and nothing is recorded.
pub async fn record_all(pool: &AnyPool, stmts: &Statements, records: &[NewsRecord]) -> Result<()> {
    if records.is_empty() {
        return Ok(());
    }

    let mut tx = pool.begin().await?;
    for record in records {
        sqlx::query(&stmts.insert)
            .bind(record.id.get())
            .bind(record.created_at)
            .bind(record.title.as_str())
            .bind(record.url.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| DatabaseError::Insert(format!("item {}: {e}", record.id)))?;
    }
    tx.commit().await?;

    Ok(())
}

/// Delete records created before `cutoff` (Unix seconds), then compact.
///
/// Returns the number of deleted rows.
pub async fn purge_older_than(pool: &AnyPool, stmts: &Statements, cutoff: i64) -> Result<u64> {
    let deleted = sqlx::query(&stmts.purge)
        .bind(cutoff)
        .execute(pool)
        .await
        .map_err(|e| DatabaseError::Purge(format!("{}: {e}", stmts.table)))?
        .rows_affected();

    if let Some(vacuum) = stmts.vacuum {
        sqlx::query(vacuum)
            .execute(pool)
            .await
            .map_err(|e| DatabaseError::Purge(format!("compaction failed: {e}")))?;
    }

    Ok(deleted)
}

/// Number of recorded items.
pub async fn count(pool: &AnyPool, stmts: &Statements) -> Result<i64> {
    let n = sqlx::query_scalar::<Any, i64>(&stmts.count)
        .fetch_one(pool)
        .await?;
    Ok(n)
}
