//! Redis-backed store for cached weekly recommendation sets.
//!
//! ## Configuration
//!
//! Environment variables:
//! - `REDIS_ENABLED`: Set to "true" to use Redis (default: false)
//! - `REDIS_URL`: Redis connection URL (default: redis://localhost:6379)

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::{debug, info, warn};

use paperwise_core::{defaults, CacheEntry, CacheKey, Error, RecommendationStore, Result};

/// Recommendation store backed by Redis.
///
/// Entries are written with a Redis expiry matching their own `expires_at`,
/// so stale sets disappear even if nobody reads them again.
#[derive(Clone)]
pub struct RedisRecommendationStore {
    connection: ConnectionManager,
    prefix: String,
}

impl RedisRecommendationStore {
    /// Connect to Redis at `redis_url`.
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| Error::Cache(format!("Invalid Redis URL: {}", e)))?;
        let connection = ConnectionManager::new(client)
            .await
            .map_err(|e| Error::Cache(format!("Failed to connect to Redis: {}", e)))?;
        Ok(Self {
            connection,
            prefix: defaults::CACHE_KEY_PREFIX.to_string(),
        })
    }

    /// Connect according to `REDIS_ENABLED` and `REDIS_URL`.
    ///
    /// Returns `None` when Redis is disabled or unreachable; the caller falls
    /// back to a process-local store.
    pub async fn from_env() -> Option<Self> {
        let enabled = std::env::var("REDIS_ENABLED")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);
        if !enabled {
            info!("Redis recommendation cache disabled via REDIS_ENABLED");
            return None;
        }

        let redis_url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
        match Self::connect(&redis_url).await {
            Ok(store) => {
                info!(
                    "Redis recommendation cache enabled (URL: {})",
                    redis_url.replace(|c: char| c.is_ascii_alphanumeric(), "*")
                );
                Some(store)
            }
            Err(e) => {
                warn!("Redis unavailable, using in-process cache: {}", e);
                None
            }
        }
    }

    /// Redis key for a cache key.
    pub fn redis_key(&self, key: &CacheKey) -> String {
        format!("{}{}", self.prefix, key)
    }
}

/// Seconds until `entry` expires, at least one.
pub fn expiry_seconds(entry: &CacheEntry) -> u64 {
    (entry.expires_at - Utc::now())
        .to_std()
        .unwrap_or(Duration::ZERO)
        .as_secs()
        .max(1)
}

#[async_trait]
impl RecommendationStore for RedisRecommendationStore {
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>> {
        let redis_key = self.redis_key(key);
        let mut conn = self.connection.clone();
        let data: Option<String> = conn
            .get(&redis_key)
            .await
            .map_err(|e| Error::Cache(format!("Redis GET error: {}", e)))?;

        match data {
            Some(data) => {
                let entry: CacheEntry = serde_json::from_str(&data)?;
                debug!("Cache HIT: {}", redis_key);
                Ok(Some(entry))
            }
            None => {
                debug!("Cache MISS: {}", redis_key);
                Ok(None)
            }
        }
    }

    async fn put(&self, entry: CacheEntry) -> Result<()> {
        let redis_key = self.redis_key(&entry.key);
        let ttl = expiry_seconds(&entry);
        let serialized = serde_json::to_string(&entry)?;
        let mut conn = self.connection.clone();
        conn.set_ex::<_, _, ()>(&redis_key, serialized, ttl)
            .await
            .map_err(|e| Error::Cache(format!("Redis SET error: {}", e)))?;
        debug!("Cache SET: {} (TTL: {}s)", redis_key, ttl);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let pattern = format!("{}*", self.prefix);
        let mut conn = self.connection.clone();
        let keys: Vec<String> = redis::cmd("KEYS")
            .arg(&pattern)
            .query_async(&mut conn)
            .await
            .map_err(|e| Error::Cache(format!("Redis KEYS error: {}", e)))?;

        if keys.is_empty() {
            debug!("Cache FLUSH: no keys to remove");
            return Ok(());
        }
        conn.del::<_, ()>(&keys[..])
            .await
            .map_err(|e| Error::Cache(format!("Redis flush error: {}", e)))?;
        info!("Cache FLUSH: removed {} keys", keys.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paperwise_core::{ActivityLevel, RecommendationSet, SignalSource, UserProfile};
    use std::collections::{BTreeMap, HashMap};
    use uuid::Uuid;

    fn entry(expires_in: chrono::Duration) -> CacheEntry {
        let now = Utc::now();
        CacheEntry {
            key: CacheKey::new(Uuid::new_v4(), None),
            value: RecommendationSet {
                categories: BTreeMap::new(),
                generated_at: now,
                profile_snapshot: UserProfile {
                    primary_domains: vec![],
                    domain_confidence: HashMap::new(),
                    signal_source: SignalSource::GenericDefault,
                    activity_level: ActivityLevel::New,
                },
            },
            expires_at: now + expires_in,
        }
    }

    #[test]
    fn test_expiry_seconds_follows_entry() {
        let secs = expiry_seconds(&entry(chrono::Duration::hours(6)));
        assert!(secs > 6 * 3600 - 5 && secs <= 6 * 3600);
    }

    #[test]
    fn test_expiry_seconds_floor_for_expired_entry() {
        assert_eq!(expiry_seconds(&entry(chrono::Duration::seconds(-30))), 1);
    }
}
