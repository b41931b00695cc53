//! Test helpers for jobserver service tests

use std::io::Write;

use tempfile::NamedTempFile;

use super::fixtures;
use crate::services::JsonDocumentStore;

/// Create a store over the fixture collection
pub fn create_test_store() -> JsonDocumentStore {
    JsonDocumentStore::from_documents(fixtures::create_test_jobs())
}

/// Write `contents` to a temporary file that lives as long as the handle
pub fn write_temp_collection(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
