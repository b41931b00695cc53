//! In-process TTL cache store backed by Moka
//!
//! Each entry carries the lifetime it was stored with; Moka expires it on
//! read and evicts it during its own housekeeping. Not shared between
//! processes.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;

use crate::error::JobServerResult;
use crate::traits::CacheStore;

const COMPONENT: &str = "memory_cache";

/// Entries held when no capacity is configured
pub const DEFAULT_CACHE_CAPACITY: u64 = 1_000;

#[derive(Debug, Clone)]
struct CachedValue {
    value: String,
    ttl: Duration,
}

/// Expires every entry after the TTL given to the `set` that wrote it
struct PerEntryTtl;

impl Expiry<String, CachedValue> for PerEntryTtl {
    fn expire_after_create(&self, _key: &String, value: &CachedValue, _created_at: Instant) -> Option<Duration> {
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

/// Real cache store kept in process memory
#[derive(Clone)]
pub struct MemoryCacheStore {
    cache: moka::future::Cache<String, CachedValue>,
}

impl std::fmt::Debug for MemoryCacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCacheStore")
            .field("max_capacity", &self.cache.policy().max_capacity())
            .field("entry_count", &self.cache.entry_count())
            .finish()
    }
}

impl Default for MemoryCacheStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding at most `max_capacity` entries
    pub fn with_capacity(max_capacity: u64) -> Self {
        let cache = moka::future::Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(PerEntryTtl)
            .build();

        shared::service_debug!(COMPONENT, max_capacity = max_capacity, "Moka cache store created");
        Self { cache }
    }

    /// Live entries, after flushing pending evictions
    pub async fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> JobServerResult<Option<String>> {
        let cached = self.cache.get(key).await;
        if cached.is_some() {
            shared::service_debug!(COMPONENT, key = key, "Cache HIT");
        } else {
            shared::service_debug!(COMPONENT, key = key, "Cache MISS");
        }
        Ok(cached.map(|cached| cached.value))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> JobServerResult<()> {
        self.cache.insert(key.to_string(), CachedValue { value, ttl }).await;
        shared::service_debug!(COMPONENT, key = key, ttl_ms = ttl.as_millis() as u64, "Cache SET");
        Ok(())
    }

    async fn ping(&self) -> JobServerResult<()> {
        Ok(())
    }
}
