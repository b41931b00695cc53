//! Distinct-value set cache adapter
//!
//! Encodes sets as JSON arrays in a [`CacheStore`]. Reads fail open: an
//! unreachable store or an undecodable entry both read as a miss.

use std::sync::Arc;
use std::time::Duration;

use shared::{AttributeKey, DistinctValueSet};

use crate::error::{JobServerError, JobServerResult};
use crate::traits::CacheStore;

const COMPONENT: &str = "value_cache";

pub struct ValueSetCache<C: CacheStore> {
    store: Arc<C>,
}

impl<C: CacheStore> Clone for ValueSetCache<C> {
    fn clone(&self) -> Self {
        Self { store: self.store.clone() }
    }
}

impl<C: CacheStore> ValueSetCache<C> {
    pub fn new(store: Arc<C>) -> Self {
        Self { store }
    }

    /// Cached set for `key`, or `None` on a miss of any kind
    pub async fn get(&self, key: &AttributeKey) -> Option<DistinctValueSet> {
        let raw = match self.store.get(key.cache_key()).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                shared::service_warn!(COMPONENT, attribute = %key, "Cache read failed, treating as miss: {}", e);
                return None;
            }
        };

        match DistinctValueSet::from_json(&raw) {
            Ok(values) => Some(values),
            Err(e) => {
                shared::service_warn!(COMPONENT, attribute = %key, "Discarding undecodable cache entry: {}", e);
                None
            }
        }
    }

    /// Store `values` under `key` for `ttl`, replacing any previous entry
    pub async fn put(
        &self,
        key: &AttributeKey,
        values: &DistinctValueSet,
        ttl: Duration,
    ) -> JobServerResult<()> {
        let encoded = values.to_json().map_err(|e| JobServerError::CacheSerialization {
            key: key.cache_key().to_string(),
            message: e.to_string(),
        })?;
        self.store.set(key.cache_key(), encoded, ttl).await
    }
}
