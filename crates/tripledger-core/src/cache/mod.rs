//! Itinerary result cache.
//!
//! Extraction is expensive and delivered messages never change, so final
//! itineraries are cached per message. A cache is purely an optimization:
//! stores may evict entries at any time and callers must tolerate misses.

mod key;
mod memory;
mod sqlite;

pub use key::CacheKey;
pub use memory::MemoryCache;
pub use sqlite::SqliteCache;

use async_trait::async_trait;

/// Errors raised by a cache store.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Database operation failed.
    #[error("Cache database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O error.
    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Backend-specific failure.
    #[error("Cache error: {0}")]
    Other(String),
}

/// Key-value store for serialized itineraries.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Looks up a cached value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>, CacheError>;

    /// Stores a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    async fn set(&self, key: &CacheKey, value: Vec<u8>) -> Result<(), CacheError>;
}

/// A cache that never stores anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCache;

#[async_trait]
impl CacheStore for NoCache {
    async fn get(&self, _key: &CacheKey) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(None)
    }

    async fn set(&self, _key: &CacheKey, _value: Vec<u8>) -> Result<(), CacheError> {
        Ok(())
    }
}
