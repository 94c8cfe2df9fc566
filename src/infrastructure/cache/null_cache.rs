//! No-op cache implementation for disabled caching.

use super::service::{CacheResult, CacheService};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// A cache implementation that does nothing.
///
/// Every lookup misses, so the listing endpoint always reads from storage.
pub struct NullCache;

impl NullCache {
    /// Creates a new NullCache instance.
    pub fn new() -> Self {
        debug!("Using NullCache (caching disabled)");
        Self
    }
}

impl Default for NullCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheService for NullCache {
    async fn get(&self, _key: &str) -> CacheResult<Option<String>> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> CacheResult<()> {
        Ok(())
    }

    async fn invalidate(&self, _key: &str) -> CacheResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn backend(&self) -> &'static str {
        "none"
    }
}
