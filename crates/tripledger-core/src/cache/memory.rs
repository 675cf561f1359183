//! Process-local LRU cache.

use std::num::NonZeroUsize;
use std::time::Duration;

use async_trait::async_trait;
use lru::LruCache;
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::{CacheError, CacheKey, CacheStore};

struct Entry {
    data: Vec<u8>,
    stored_at: Instant,
}

/// In-memory cache with bounded capacity and optional time-to-live.
pub struct MemoryCache {
    store: Mutex<LruCache<String, Entry>>,
    ttl: Option<Duration>,
}

impl MemoryCache {
    /// Creates a cache holding at most `capacity` entries.
    ///
    /// A capacity of zero is treated as one. Entries older than `ttl` read as
    /// misses; `None` keeps entries until they are evicted.
    #[must_use]
    pub fn new(capacity: usize, ttl: Option<Duration>) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            store: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    /// Number of stored entries, including expired ones not yet evicted.
    pub async fn len(&self) -> usize {
        self.store.lock().await.len()
    }

    /// Whether the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.store.lock().await.is_empty()
    }

    fn is_expired(&self, entry: &Entry) -> bool {
        self.ttl
            .is_some_and(|ttl| entry.stored_at.elapsed() > ttl)
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>, CacheError> {
        let mut store = self.store.lock().await;
        let Some(entry) = store.get(key.as_str()) else {
            return Ok(None);
        };
        if self.is_expired(entry) {
            store.pop(key.as_str());
            return Ok(None);
        }
        Ok(Some(entry.data.clone()))
    }

    async fn set(&self, key: &CacheKey, value: Vec<u8>) -> Result<(), CacheError> {
        let mut store = self.store.lock().await;
        store.put(
            key.as_str().to_string(),
            Entry {
                data: value,
                stored_at: Instant::now(),
            },
        );
        Ok(())
    }
}
