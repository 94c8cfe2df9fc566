//! Caching layer backing the country listing.
//!
//! Provides a [`CacheService`] trait with three implementations:
//! - [`MemoryCache`] - In-process cache (default)
//! - [`RedisCache`] - Shared Redis-backed cache for multi-instance deployments
//! - [`NullCache`] - No-op implementation for disabled caching

mod memory_cache;
mod null_cache;
mod redis_cache;
mod service;

pub use memory_cache::MemoryCache;
pub use null_cache::NullCache;
pub use redis_cache::RedisCache;
pub use service::{CacheError, CacheResult, CacheService};
