//! JSON file backed job collection
//!
//! Loads the collection once at startup, either as a top-level JSON array of
//! objects or as newline-delimited objects. Cursors are snapshots over the
//! shared collection and report themselves to the store while open.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use shared::{Document, DocumentId, DOCUMENT_ID_FIELD};

use crate::error::{JobServerError, JobServerResult};
use crate::traits::{DocumentCursor, DocumentStore};

const COMPONENT: &str = "json_store";

/// Documents a cursor hands out before yielding to the runtime
const YIELD_EVERY: usize = 1024;

/// Real document store over an in-memory snapshot of a JSON collection
#[derive(Debug, Clone)]
pub struct JsonDocumentStore {
    documents: Arc<Vec<Document>>,
    index: Arc<HashMap<DocumentId, usize>>,
    open_cursors: Arc<AtomicUsize>,
    source: Option<PathBuf>,
}

impl JsonDocumentStore {
    /// Create a store over already parsed documents
    pub fn from_documents(documents: Vec<Document>) -> Self {
        let index = documents
            .iter()
            .enumerate()
            .filter_map(|(position, document)| {
                DocumentId::from_document(document).map(|id| (id, position))
            })
            .collect();

        Self {
            documents: Arc::new(documents),
            index: Arc::new(index),
            open_cursors: Arc::new(AtomicUsize::new(0)),
            source: None,
        }
    }

    /// Load the collection from a JSON or JSON lines file
    pub async fn load(path: impl AsRef<Path>) -> JobServerResult<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            JobServerError::store(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let documents = Self::parse_collection(&raw)?;
        shared::service_info!(COMPONENT, "Loaded {} job documents from {}", documents.len(), path.display());

        let mut store = Self::from_documents(documents);
        store.source = Some(path.to_path_buf());
        Ok(store)
    }

    /// Parse either a JSON array or newline-delimited JSON objects.
    ///
    /// Entries that are not objects are skipped.
    pub fn parse_collection(raw: &str) -> JobServerResult<Vec<Document>> {
        let values: Vec<Value> = if raw.trim_start().starts_with('[') {
            serde_json::from_str(raw)?
        } else {
            raw.lines()
                .filter(|line| !line.trim().is_empty())
                .map(serde_json::from_str::<Value>)
                .collect::<Result<_, _>>()?
        };

        let total = values.len();
        let documents: Vec<Document> = values
            .into_iter()
            .filter_map(|value| match value {
                Value::Object(document) => Some(document),
                _ => None,
            })
            .collect();

        if documents.len() < total {
            shared::service_warn!(COMPONENT, "Skipped {} entries that are not JSON objects", total - documents.len());
        }
        Ok(documents)
    }

    /// Number of documents in the collection
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Cursors handed out and not yet closed
    pub fn open_cursors(&self) -> usize {
        self.open_cursors.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentStore for JsonDocumentStore {
    async fn find_by_id(&self, id: &DocumentId) -> JobServerResult<Option<Document>> {
        Ok(self
            .index
            .get(id)
            .and_then(|position| self.documents.get(*position))
            .cloned())
    }

    async fn open_projection(&self, field: &str) -> JobServerResult<Box<dyn DocumentCursor>> {
        self.open_cursors.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(SnapshotCursor {
            documents: self.documents.clone(),
            field: field.to_string(),
            position: 0,
            open_cursors: Some(self.open_cursors.clone()),
        }))
    }

    async fn ping(&self) -> JobServerResult<()> {
        match &self.source {
            Some(path) => tokio::fs::metadata(path).await.map(|_| ()).map_err(|e| {
                JobServerError::store(format!("{} is not accessible: {}", path.display(), e))
            }),
            None => Ok(()),
        }
    }
}

/// Cursor over a collection snapshot, yielding `_id` plus one field
pub struct SnapshotCursor {
    documents: Arc<Vec<Document>>,
    field: String,
    position: usize,
    open_cursors: Option<Arc<AtomicUsize>>,
}

impl SnapshotCursor {
    fn project(&self, document: &Document) -> Document {
        let mut projected = Document::new();
        if let Some(id) = document.get(DOCUMENT_ID_FIELD) {
            projected.insert(DOCUMENT_ID_FIELD.to_string(), id.clone());
        }
        if let Some(value) = document.get(&self.field) {
            projected.insert(self.field.clone(), value.clone());
        }
        projected
    }
}

#[async_trait]
impl DocumentCursor for SnapshotCursor {
    async fn next_document(&mut self) -> JobServerResult<Option<Document>> {
        if self.open_cursors.is_none() {
            return Err(JobServerError::store("cursor already closed"));
        }

        while self.position < self.documents.len() {
            let position = self.position;
            self.position += 1;

            if position > 0 && position % YIELD_EVERY == 0 {
                tokio::task::yield_now().await;
            }

            let document = &self.documents[position];
            if document.contains_key(&self.field) {
                return Ok(Some(self.project(document)));
            }
        }
        Ok(None)
    }

    fn close(&mut self) {
        if let Some(open_cursors) = self.open_cursors.take() {
            open_cursors.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

impl Drop for SnapshotCursor {
    fn drop(&mut self) {
        self.close();
    }
}
