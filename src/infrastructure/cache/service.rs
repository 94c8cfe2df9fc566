//! Cache service trait and error types.

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

/// Errors that can occur during cache operations.
#[derive(Debug)]
pub enum CacheError {
    ConnectionError(String),
    OperationError(String),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::ConnectionError(e) => write!(f, "Cache connection error: {}", e),
            Self::OperationError(e) => write!(f, "Cache operation error: {}", e),
        }
    }
}

impl std::error::Error for CacheError {}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Time-bounded key/value store with explicit invalidation.
///
/// Values are opaque strings; callers own serialization. Each operation is
/// atomic on its own, nothing spans operations. Implementations must degrade
/// gracefully: a failing backend behaves like an empty cache.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::MemoryCache`] - In-process map with absolute expiry
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache with `SET EX`
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation for disabled caching
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Returns the value stored under `key`, or `None` on miss or expiry.
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Stores `value` under `key`, expiring `ttl` after this call.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()>;

    /// Removes `key`. Removing an absent key is not an error.
    async fn invalidate(&self, key: &str) -> CacheResult<()>;

    /// Checks if the cache backend is healthy.
    async fn health_check(&self) -> bool;

    /// Short backend name for logs and health output.
    fn backend(&self) -> &'static str;
}
