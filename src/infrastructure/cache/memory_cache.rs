//! In-process cache with absolute per-entry expiry.

use super::service::{CacheResult, CacheService};
use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use std::time::{Duration, Instant};
use tracing::debug;

const MAX_ENTRIES: u64 = 1_000;

#[derive(Clone)]
struct CachedValue {
    value: String,
    ttl: Duration,
}

/// Expires every entry `ttl` after it was written. Reads never extend it.
struct WriteTtl;

impl Expiry<String, CachedValue> for WriteTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedValue,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Process-local cache.
///
/// Created once at startup and shared through [`crate::state::AppState`].
/// Expired entries are never returned.
pub struct MemoryCache {
    entries: Cache<String, CachedValue>,
}

impl MemoryCache {
    pub fn new() -> Self {
        debug!("Using MemoryCache");

        let entries = Cache::builder()
            .max_capacity(MAX_ENTRIES)
            .expire_after(WriteTtl)
            .build();

        Self { entries }
    }

    /// Number of live entries once pending evictions have run.
    pub async fn len(&self) -> u64 {
        self.entries.run_pending_tasks().await;
        self.entries.entry_count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheService for MemoryCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        match self.entries.get(key).await {
            Some(cached) => {
                debug!("Cache HIT: {}", key);
                Ok(Some(cached.value))
            }
            None => {
                debug!("Cache MISS: {}", key);
                Ok(None)
            }
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        self.entries
            .insert(
                key.to_string(),
                CachedValue {
                    value: value.to_string(),
                    ttl,
                },
            )
            .await;

        debug!("Cache SET: {} (TTL: {}s)", key, ttl.as_secs());
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> CacheResult<()> {
        if self.entries.remove(key).await.is_some() {
            debug!("Cache INVALIDATE: {}", key);
        }
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(600);
    const SHORT_TTL: Duration = Duration::from_millis(50);

    #[tokio::test]
    async fn test_get_returns_value_before_expiry() {
        let cache = MemoryCache::new();
        cache.set("countries:all", "[1]", TTL).await.unwrap();

        assert_eq!(
            cache.get("countries:all").await.unwrap(),
            Some("[1]".to_string())
        );
    }

    #[tokio::test]
    async fn test_entry_expires_after_ttl() {
        let cache = MemoryCache::new();
        cache.set("countries:all", "[1]", SHORT_TTL).await.unwrap();

        tokio::time::sleep(SHORT_TTL * 3).await;

        assert_eq!(cache.get("countries:all").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expiry_is_absolute_not_sliding() {
        let cache = MemoryCache::new();
        let ttl = Duration::from_millis(200);
        cache.set("countries:all", "[1]", ttl).await.unwrap();

        for _ in 0..3 {
            tokio::time::sleep(Duration::from_millis(50)).await;
            assert!(cache.get("countries:all").await.unwrap().is_some());
        }

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(cache.get("countries:all").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_overwrite_uses_new_ttl() {
        let cache = MemoryCache::new();
        cache.set("countries:all", "[1]", SHORT_TTL).await.unwrap();
        cache.set("countries:all", "[2]", TTL).await.unwrap();

        tokio::time::sleep(SHORT_TTL * 3).await;

        assert_eq!(
            cache.get("countries:all").await.unwrap(),
            Some("[2]".to_string())
        );
    }

    #[tokio::test]
    async fn test_invalidate_removes_entry() {
        let cache = MemoryCache::new();
        cache.set("countries:all", "[1]", TTL).await.unwrap();

        cache.invalidate("countries:all").await.unwrap();

        assert_eq!(cache.get("countries:all").await.unwrap(), None);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_invalidate_absent_key_is_ok() {
        let cache = MemoryCache::new();
        assert!(cache.invalidate("missing").await.is_ok());
    }

    #[tokio::test]
    async fn test_expired_entries_are_evicted() {
        let cache = MemoryCache::new();
        cache.set("short", "a", SHORT_TTL).await.unwrap();
        cache.set("long", "b", TTL).await.unwrap();

        tokio::time::sleep(SHORT_TTL * 3).await;

        assert_eq!(cache.len().await, 1);
    }
}
