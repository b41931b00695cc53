//! Service trait definitions for dependency injection
//!
//! Both backing services (the job collection and the cache) are reached only
//! through these traits, so the core can be exercised against mocks.

use async_trait::async_trait;
use std::time::Duration;

use shared::{Document, DocumentId};
use crate::error::JobServerResult;

/// Queryable job document collection
#[mockall::automock]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Point lookup of a full document by identifier
    async fn find_by_id(&self, id: &DocumentId) -> JobServerResult<Option<Document>>;

    /// Open a streaming read over every document holding `field`.
    ///
    /// Yielded documents carry only `_id` and `field`. The returned cursor is
    /// exclusively owned by the caller, who must close it.
    async fn open_projection(&self, field: &str) -> JobServerResult<Box<dyn DocumentCursor>>;

    /// Check the store is reachable
    async fn ping(&self) -> JobServerResult<()>;
}

/// Incremental reader over the result of a projection
#[mockall::automock]
#[async_trait]
pub trait DocumentCursor: Send {
    /// Next document, or `None` once the stream is exhausted
    async fn next_document(&mut self) -> JobServerResult<Option<Document>>;

    /// Release the underlying handle. Must be idempotent.
    fn close(&mut self);
}

/// String-keyed store with per-entry expiry
#[mockall::automock]
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Value stored under `key`, if present and not expired
    async fn get(&self, key: &str) -> JobServerResult<Option<String>>;

    /// Store `value` under `key` for `ttl`, replacing any previous entry
    async fn set(&self, key: &str, value: String, ttl: Duration) -> JobServerResult<()>;

    /// Check the store is reachable
    async fn ping(&self) -> JobServerResult<()>;
}
