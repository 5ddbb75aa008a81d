use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use crate::{
    cache::{CacheEntry, CacheStore},
    error::Result,
};

#[derive(FromRow)]
struct CacheRow {
    key: String,
    value: String,
    fetched_at: NaiveDateTime,
}

/// Persists query-cache entries in the `query_cache` table.
pub struct SqliteCacheStore {
    pool: SqlitePool,
}

impl SqliteCacheStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CacheStore for SqliteCacheStore {
    async fn load_all(&self) -> Result<Vec<(String, CacheEntry)>> {
        let rows = sqlx::query_as::<_, CacheRow>(
            "SELECT key, value, fetched_at FROM query_cache"
        )
        .fetch_all(&self.pool)
        .await?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            match serde_json::from_str(&row.value) {
                Ok(value) => entries.push((
                    row.key,
                    CacheEntry {
                        value,
                        fetched_at: DateTime::from_naive_utc_and_offset(row.fetched_at, Utc),
                    },
                )),
                Err(e) => tracing::warn!("Skipping corrupt cache row {}: {}", row.key, e),
            }
        }

        Ok(entries)
    }

    async fn save(&self, key: &str, entry: &CacheEntry) -> Result<()> {
        let value = serde_json::to_string(&entry.value)?;

        sqlx::query(
            r#"
            INSERT INTO query_cache (key, value, fetched_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                fetched_at = excluded.fetched_at
            "#
        )
        .bind(key)
        .bind(&value)
        .bind(entry.fetched_at.naive_utc())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM query_cache WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn remove_prefix(&self, prefix: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM query_cache WHERE substr(key, 1, length(?)) = ?")
            .bind(prefix)
            .bind(prefix)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
