//! Redis cache store
//!
//! Uses `redis::aio::ConnectionManager` for a multiplexed connection that
//! reconnects on its own. Entries are written with `SETEX`, so Redis owns
//! expiry and the values are shared by every server instance.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::{JobServerError, JobServerResult};
use crate::traits::CacheStore;

const COMPONENT: &str = "redis_cache";

/// Real cache store backed by a Redis server
#[derive(Clone)]
pub struct RedisCacheStore {
    connection_manager: redis::aio::ConnectionManager,
}

impl std::fmt::Debug for RedisCacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCacheStore")
            .field("connection_manager", &"ConnectionManager")
            .finish()
    }
}

impl RedisCacheStore {
    /// Connect to the server at `url`, e.g. `redis://localhost:6379/0`
    pub async fn connect(url: &str) -> JobServerResult<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| JobServerError::cache(format!("Invalid Redis URL {}: {}", redact_url(url), e)))?;

        let connection_manager = redis::aio::ConnectionManager::new(client)
            .await
            .map_err(|e| JobServerError::cache(format!("Failed to connect to {}: {}", redact_url(url), e)))?;

        shared::service_info!(COMPONENT, url = %redact_url(url), "Redis cache store connected");
        Ok(Self { connection_manager })
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> JobServerResult<Option<String>> {
        let mut conn = self.connection_manager.clone();
        let result: Option<String> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| JobServerError::cache(format!("Redis GET failed: {}", e)))?;

        if result.is_some() {
            shared::service_debug!(COMPONENT, key = key, "Cache HIT");
        } else {
            shared::service_debug!(COMPONENT, key = key, "Cache MISS");
        }
        Ok(result)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> JobServerResult<()> {
        let mut conn = self.connection_manager.clone();
        // SETEX has whole-second resolution
        let ttl_seconds = ttl.as_secs().max(1);

        redis::cmd("SETEX")
            .arg(key)
            .arg(ttl_seconds)
            .arg(value)
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| JobServerError::cache(format!("Redis SETEX failed: {}", e)))?;

        shared::service_debug!(COMPONENT, key = key, ttl_seconds = ttl_seconds, "Cache SET");
        Ok(())
    }

    async fn ping(&self) -> JobServerResult<()> {
        let mut conn = self.connection_manager.clone();
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| JobServerError::cache(format!("Redis PING failed: {}", e)))?;

        if pong == "PONG" {
            Ok(())
        } else {
            Err(JobServerError::cache(format!("Unexpected PING reply: {}", pong)))
        }
    }
}

/// Hide the password in a Redis URL before it is logged
pub(crate) fn redact_url(url: &str) -> String {
    let authority_start = url.find("//").map(|pos| pos + 2).unwrap_or(0);
    if let Some(at_pos) = url[authority_start..].find('@').map(|pos| pos + authority_start) {
        if let Some(colon_pos) = url[authority_start..at_pos].rfind(':') {
            let prefix = &url[..=authority_start + colon_pos];
            let suffix = &url[at_pos..];
            return format!("{}***{}", prefix, suffix);
        }
    }
    url.to_string()
}
