// src/services/allocator.rs

use std::sync::Arc;

use sqlx::SqlitePool;
use tokio::sync::Mutex;

use crate::error::AppError;
use crate::services::catalog::QuestionCatalog;

/// Rotating set assignment, one cursor per (class_level, stream) key.
///
/// The cursor lives in the ledger store's `set_counter` table and advances by
/// exactly one per issued assignment, wrapping at the set count. The
/// read-modify-write runs as a single `UPDATE ... RETURNING` statement and is
/// additionally serialized behind an async mutex, so two concurrent logins for
/// the same key always receive sequential, distinct labels.
pub struct SetAllocator {
    pool: SqlitePool,
    catalog: Arc<QuestionCatalog>,
    lock: Mutex<()>,
}

impl SetAllocator {
    pub fn new(pool: SqlitePool, catalog: Arc<QuestionCatalog>) -> Self {
        Self {
            pool,
            catalog,
            lock: Mutex::new(()),
        }
    }

    /// Issues the next set label for a (class, stream) pair.
    ///
    /// The candidate universe comes from the catalog scan; an empty scan
    /// already yields the fixed fallback list, so there is no error path for
    /// "no sets".
    pub async fn next_set(&self, class_level: &str, stream: &str) -> Result<String, AppError> {
        let sets = self.catalog.available_sets(class_level, stream);
        let len = sets.len() as i64;

        let _guard = self.lock.lock().await;

        // Lazily create the counter row at index 0 on first use.
        sqlx::query(
            r#"
            INSERT INTO set_counter (class_level, stream, next_index)
            VALUES (?, ?, 0)
            ON CONFLICT (class_level, stream) DO NOTHING
            "#,
        )
        .bind(class_level)
        .bind(stream)
        .execute(&self.pool)
        .await?;

        // Atomic advance; the pre-advance cursor is recovered from the
        // returned value. rem_euclid also covers a stored index left over
        // from a run with a larger set universe.
        let advanced: i64 = sqlx::query_scalar(
            r#"
            UPDATE set_counter
            SET next_index = (next_index + 1) % ?
            WHERE class_level = ? AND stream = ?
            RETURNING next_index
            "#,
        )
        .bind(len)
        .bind(class_level)
        .bind(stream)
        .fetch_one(&self.pool)
        .await?;

        let issued = (advanced - 1).rem_euclid(len) as usize;
        Ok(sets[issued].clone())
    }
}
