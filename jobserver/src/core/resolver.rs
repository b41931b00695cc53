//! Cache-aside resolution of distinct-value sets
//!
//! Serves a non-empty cached set when one exists, otherwise rescans the
//! collection and writes the fresh set back with a fixed TTL.

use std::sync::Arc;
use std::time::Duration;

use shared::{AttributeKey, DistinctValueSet};
use tokio_util::sync::CancellationToken;

use crate::core::{AttributeScanner, ValueSetCache};
use crate::error::{JobServerError, JobServerResult};
use crate::traits::{CacheStore, DocumentStore};

const COMPONENT: &str = "resolver";

/// Where a resolved set came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    CacheHit,
    Scanned,
}

pub struct UniqueValuesResolver<D: DocumentStore, C: CacheStore> {
    scanner: AttributeScanner<D>,
    cache: ValueSetCache<C>,
    ttl: Duration,
}

impl<D: DocumentStore, C: CacheStore> Clone for UniqueValuesResolver<D, C> {
    fn clone(&self) -> Self {
        Self {
            scanner: self.scanner.clone(),
            cache: self.cache.clone(),
            ttl: self.ttl,
        }
    }
}

impl<D: DocumentStore, C: CacheStore> UniqueValuesResolver<D, C> {
    pub fn new(documents: Arc<D>, cache: Arc<C>, ttl: Duration) -> Self {
        Self {
            scanner: AttributeScanner::new(documents),
            cache: ValueSetCache::new(cache),
            ttl,
        }
    }

    pub async fn resolve(&self, key: &AttributeKey) -> JobServerResult<DistinctValueSet> {
        self.resolve_with_cancel(key, &CancellationToken::new()).await
    }

    pub async fn resolve_with_cancel(
        &self,
        key: &AttributeKey,
        cancel: &CancellationToken,
    ) -> JobServerResult<DistinctValueSet> {
        self.resolve_traced(key, cancel).await.map(|(values, _)| values)
    }

    /// Resolve `key`, also reporting whether the cache answered.
    ///
    /// An empty cached set counts as a miss and triggers a rescan. Failing to
    /// write the fresh set back is logged and does not fail the request.
    pub async fn resolve_traced(
        &self,
        key: &AttributeKey,
        cancel: &CancellationToken,
    ) -> JobServerResult<(DistinctValueSet, Resolution)> {
        let cached = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(JobServerError::Cancelled),
            cached = self.cache.get(key) => cached,
        };

        if let Some(values) = cached.filter(|values| !values.is_empty()) {
            shared::service_debug!(COMPONENT, attribute = %key, "Cache hit with {} values", values.len());
            return Ok((values, Resolution::CacheHit));
        }

        let values = self.scanner.collect_with_cancel(key, cancel).await?;

        let stored = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(JobServerError::Cancelled),
            stored = self.cache.put(key, &values, self.ttl) => stored,
        };
        if let Err(e) = stored {
            shared::service_warn!(COMPONENT, attribute = %key, "Failed to cache {} values: {}", values.len(), e);
        }

        shared::service_debug!(COMPONENT, attribute = %key, "Recomputed {} values", values.len());
        Ok((values, Resolution::Scanned))
    }
}
