//! Test helper utilities for jobserver integration tests

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use jobserver::{
    DocumentCursor, DocumentStore, JobServer, JobServerError, JobServerResult, JsonDocumentStore,
    MemoryCacheStore, ServerConfig,
};
use shared::{Document, DocumentId};

use super::fixtures;

pub const TEST_TTL: Duration = Duration::from_secs(24);

/// Lifetime short enough for expiry tests to wait out in real time
pub const SHORT_TTL: Duration = Duration::from_millis(200);

/// Config with the default TTL and a short request deadline
pub fn create_test_config() -> ServerConfig {
    ServerConfig {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        cache_ttl: TEST_TTL,
        request_timeout: Duration::from_secs(5),
        ..ServerConfig::default()
    }
}

pub fn create_test_store() -> Arc<JsonDocumentStore> {
    Arc::new(JsonDocumentStore::from_documents(fixtures::create_test_jobs()))
}

pub fn create_test_server() -> JobServer<JsonDocumentStore, MemoryCacheStore> {
    JobServer::new(create_test_config(), create_test_store(), Arc::new(MemoryCacheStore::new()))
}

/// Issue a GET against the router and decode the JSON body
pub async fn get_json(router: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

/// Cursor over a fixed list of results, recording whether it was closed
pub struct ScriptedCursor {
    results: VecDeque<JobServerResult<Option<Document>>>,
    closed: Arc<AtomicBool>,
}

impl ScriptedCursor {
    pub fn from_documents(documents: Vec<Document>, closed: Arc<AtomicBool>) -> Self {
        Self {
            results: documents.into_iter().map(|d| Ok(Some(d))).collect(),
            closed,
        }
    }

    /// Yield `documents`, then fail with `error`
    pub fn failing_after(documents: Vec<Document>, error: JobServerError, closed: Arc<AtomicBool>) -> Self {
        let mut cursor = Self::from_documents(documents, closed);
        cursor.results.push_back(Err(error));
        cursor
    }
}

#[async_trait]
impl DocumentCursor for ScriptedCursor {
    async fn next_document(&mut self) -> JobServerResult<Option<Document>> {
        self.results.pop_front().unwrap_or(Ok(None))
    }

    fn close(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// Cursor that yields `documents` and then never produces another item
pub struct StallingCursor {
    documents: VecDeque<Document>,
    closed: Arc<AtomicBool>,
}

impl StallingCursor {
    pub fn new(documents: Vec<Document>, closed: Arc<AtomicBool>) -> Self {
        Self {
            documents: documents.into(),
            closed,
        }
    }
}

#[async_trait]
impl DocumentCursor for StallingCursor {
    async fn next_document(&mut self) -> JobServerResult<Option<Document>> {
        match self.documents.pop_front() {
            Some(document) => Ok(Some(document)),
            None => std::future::pending().await,
        }
    }

    fn close(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// Document store whose projections stall forever after the given documents
pub struct StallingStore {
    documents: Vec<Document>,
    pub closed: Arc<AtomicBool>,
    pub opened: AtomicUsize,
}

impl StallingStore {
    pub fn new(documents: Vec<Document>) -> Self {
        Self {
            documents,
            closed: Arc::new(AtomicBool::new(false)),
            opened: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl DocumentStore for StallingStore {
    async fn find_by_id(&self, _id: &DocumentId) -> JobServerResult<Option<Document>> {
        Ok(None)
    }

    async fn open_projection(&self, _field: &str) -> JobServerResult<Box<dyn DocumentCursor>> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(StallingCursor::new(self.documents.clone(), self.closed.clone())))
    }

    async fn ping(&self) -> JobServerResult<()> {
        Ok(())
    }
}
