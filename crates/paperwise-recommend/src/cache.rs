//! Recommendation set caching.
//!
//! Entries are keyed per user and project scope and expire after a fixed
//! TTL. The cache is best effort: backend failures are logged and read as
//! misses, never surfaced to the caller.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use paperwise_core::{
    logging, CacheEntry, CacheKey, RecommendationSet, RecommendationStore, Result,
};
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

/// Cache statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub errors: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Process-local store, used when no shared backend is configured.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl RecommendationStore for InMemoryStore {
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|entry| !entry.is_expired_at(Utc::now()))
            .cloned())
    }

    async fn put(&self, entry: CacheEntry) -> Result<()> {
        self.entries.write().await.insert(entry.key, entry);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.entries.write().await.clear();
        Ok(())
    }
}

/// TTL cache over a [`RecommendationStore`].
pub struct RecommendationCache {
    store: Arc<dyn RecommendationStore>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
    errors: AtomicU64,
}

impl RecommendationCache {
    pub fn new(store: Arc<dyn RecommendationStore>, ttl: Duration) -> Self {
        Self {
            store,
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            errors: AtomicU64::new(0),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Look up a fresh entry. Expired entries and backend errors are misses.
    #[instrument(
        skip(self, key),
        fields(subsystem = "recommend", component = "cache", op = "get", cache_key = %key)
    )]
    pub async fn get(&self, key: &CacheKey) -> Option<RecommendationSet> {
        match self.store.get(key).await {
            Ok(Some(entry)) if !entry.is_expired_at(Utc::now()) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!({ logging::CACHE_HIT } = true, "Cache hit");
                Some(entry.value)
            }
            Ok(Some(_)) => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!({ logging::CACHE_HIT } = false, "Cache entry expired");
                None
            }
            Ok(None) => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!({ logging::CACHE_HIT } = false, "Cache miss");
                None
            }
            Err(e) => {
                self.errors.fetch_add(1, Ordering::Relaxed);
                self.misses.fetch_add(1, Ordering::Relaxed);
                warn!({ logging::ERROR_MSG } = %e, "Cache read failed, treating as miss");
                None
            }
        }
    }

    /// Store a set, replacing any previous entry for the key.
    ///
    /// Returns false when the backend rejected the write.
    #[instrument(
        skip(self, key, value),
        fields(subsystem = "recommend", component = "cache", op = "put", cache_key = %key)
    )]
    pub async fn put(&self, key: CacheKey, value: RecommendationSet) -> bool {
        let ttl = chrono::Duration::from_std(self.ttl).unwrap_or_else(|_| chrono::Duration::hours(6));
        let entry = CacheEntry {
            key,
            value,
            expires_at: Utc::now() + ttl,
        };
        match self.store.put(entry).await {
            Ok(()) => {
                debug!(ttl_secs = self.ttl.as_secs(), "Cached recommendation set");
                true
            }
            Err(e) => {
                self.errors.fetch_add(1, Ordering::Relaxed);
                warn!({ logging::ERROR_MSG } = %e, "Cache write failed");
                false
            }
        }
    }

    /// Drop every entry.
    pub async fn clear(&self) -> Result<()> {
        self.store.clear().await
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}
