//! Persistent itinerary cache backed by `SQLite`.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use super::{CacheError, CacheKey, CacheStore};
use crate::Result;

/// Cache storing serialized itineraries in an `SQLite` database.
pub struct SqliteCache {
    pool: SqlitePool,
    ttl: Option<Duration>,
}

impl SqliteCache {
    /// Open (or create) a cache database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn new(database_path: &str, ttl: Option<Duration>) -> Result<Self> {
        let url = format!("sqlite:{database_path}?mode=rwc");
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await?;

        let cache = Self { pool, ttl };
        cache.initialize().await?;
        Ok(cache)
    }

    /// Create an in-memory cache for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn in_memory(ttl: Option<Duration>) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let cache = Self { pool, ttl };
        cache.initialize().await?;
        Ok(cache)
    }

    /// Initialize database schema.
    async fn initialize(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS itinerary_cache (
                cache_key TEXT PRIMARY KEY NOT NULL,
                value BLOB NOT NULL,
                cached_at INTEGER NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE INDEX IF NOT EXISTS idx_itinerary_cache_age
            ON itinerary_cache(cached_at)
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn store_at(
        &self,
        key: &CacheKey,
        value: &[u8],
        cached_at: DateTime<Utc>,
    ) -> std::result::Result<(), sqlx::Error> {
        sqlx::query(
            r"
            INSERT INTO itinerary_cache (cache_key, value, cached_at)
            VALUES (?, ?, ?)
            ON CONFLICT(cache_key) DO UPDATE SET
                value = excluded.value,
                cached_at = excluded.cached_at
            ",
        )
        .bind(key.as_str())
        .bind(value)
        .bind(cached_at.timestamp_millis())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Oldest `cached_at` still considered fresh, if entries expire.
    ///
    /// A lifetime reaching past the earliest representable time never expires.
    fn cutoff(&self) -> Option<i64> {
        let ttl = self.ttl?;
        Utc::now()
            .checked_sub_signed(ttl)
            .map(|cutoff| cutoff.timestamp_millis())
    }

    /// Remove a single entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn remove(&self, key: &CacheKey) -> Result<()> {
        sqlx::query(r"DELETE FROM itinerary_cache WHERE cache_key = ?")
            .bind(key.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Delete all expired entries, returning how many were removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn purge_expired(&self) -> Result<u64> {
        let Some(cutoff) = self.cutoff() else {
            return Ok(0);
        };

        let result = sqlx::query(r"DELETE FROM itinerary_cache WHERE cached_at < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Delete every entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn clear(&self) -> Result<()> {
        sqlx::query(r"DELETE FROM itinerary_cache")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Number of stored entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count(&self) -> Result<i64> {
        let row = sqlx::query(r"SELECT COUNT(*) as count FROM itinerary_cache")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("count"))
    }
}

#[async_trait]
impl CacheStore for SqliteCache {
    async fn get(&self, key: &CacheKey) -> std::result::Result<Option<Vec<u8>>, CacheError> {
        let row = sqlx::query(
            r"
            SELECT value, cached_at
            FROM itinerary_cache
            WHERE cache_key = ?
            ",
        )
        .bind(key.as_str())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let cached_at: i64 = row.get("cached_at");
        if self.cutoff().is_some_and(|cutoff| cached_at < cutoff) {
            return Ok(None);
        }

        Ok(Some(row.get("value")))
    }

    async fn set(&self, key: &CacheKey, value: Vec<u8>) -> std::result::Result<(), CacheError> {
        self.store_at(key, &value, Utc::now()).await?;
        Ok(())
    }
}
