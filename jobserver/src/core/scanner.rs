//! Attribute scanning over the job collection
//!
//! Streams every document holding an attribute, splits the delimited field
//! value and accumulates the distinct tokens.

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use shared::{AttributeKey, DistinctValueSet, Document};
use tokio_util::sync::CancellationToken;

use crate::error::{JobServerError, JobServerResult};
use crate::traits::{DocumentCursor, DocumentStore};

const COMPONENT: &str = "scanner";

/// Counters for one scan, logged when it completes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ScanStats {
    documents_scanned: u64,
    documents_skipped: u64,
    distinct_values: usize,
}

/// Owns an open cursor and closes it when dropped
struct CursorGuard {
    cursor: Box<dyn DocumentCursor>,
}

impl CursorGuard {
    fn new(cursor: Box<dyn DocumentCursor>) -> Self {
        Self { cursor }
    }

    async fn next_document(&mut self) -> JobServerResult<Option<Document>> {
        self.cursor.next_document().await
    }
}

impl Drop for CursorGuard {
    fn drop(&mut self) {
        self.cursor.close();
    }
}

/// Computes distinct-value sets from a document store
pub struct AttributeScanner<D: DocumentStore> {
    store: Arc<D>,
}

impl<D: DocumentStore> Clone for AttributeScanner<D> {
    fn clone(&self) -> Self {
        Self { store: self.store.clone() }
    }
}

impl<D: DocumentStore> AttributeScanner<D> {
    pub fn new(store: Arc<D>) -> Self {
        Self { store }
    }

    /// Scan the whole collection and return the distinct values of `key`
    pub async fn collect(&self, key: &AttributeKey) -> JobServerResult<DistinctValueSet> {
        self.collect_with_cancel(key, &CancellationToken::new()).await
    }

    /// Like [`collect`](Self::collect), aborting as soon as `cancel` fires.
    ///
    /// The cursor is released on every exit path. A failure part way through
    /// the stream discards everything accumulated so far.
    pub async fn collect_with_cancel(
        &self,
        key: &AttributeKey,
        cancel: &CancellationToken,
    ) -> JobServerResult<DistinctValueSet> {
        if cancel.is_cancelled() {
            return Err(JobServerError::Cancelled);
        }

        let start = Instant::now();
        let cursor = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(JobServerError::Cancelled),
            opened = self.store.open_projection(key.field()) => {
                opened.map_err(|e| scan_failed(key, &e))?
            }
        };
        let mut guard = CursorGuard::new(cursor);

        let mut values = DistinctValueSet::new();
        let mut stats = ScanStats::default();

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    shared::service_debug!(COMPONENT, attribute = %key, "Scan cancelled after {} documents", stats.documents_scanned);
                    return Err(JobServerError::Cancelled);
                }
                next = guard.next_document() => next,
            };

            match next {
                Ok(Some(document)) => {
                    stats.documents_scanned += 1;
                    match document.get(key.field()).and_then(Value::as_str) {
                        Some(raw) => {
                            values.extend_from_field(raw);
                        }
                        None => stats.documents_skipped += 1,
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    shared::service_warn!(COMPONENT, attribute = %key, "Scan aborted after {} documents: {}", stats.documents_scanned, e);
                    return Err(scan_failed(key, &e));
                }
            }
        }
        drop(guard);

        stats.distinct_values = values.len();
        shared::service_debug!(
            COMPONENT,
            attribute = %key,
            scanned = stats.documents_scanned,
            skipped = stats.documents_skipped,
            distinct = stats.distinct_values,
            "Scan took {} µs",
            start.elapsed().as_micros()
        );

        Ok(values)
    }
}

fn scan_failed(key: &AttributeKey, error: &JobServerError) -> JobServerError {
    JobServerError::ScanFailed {
        attribute: key.to_string(),
        message: error.to_string(),
    }
}
