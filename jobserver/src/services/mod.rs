//! Service implementations
//!
//! Real implementations of the backing-service traits for production use

pub mod json_store;
pub mod memory_cache;
pub mod redis_cache;

#[cfg(test)]
mod tests;

// Re-export service implementations
pub use json_store::{JsonDocumentStore, SnapshotCursor};
pub use memory_cache::{MemoryCacheStore, DEFAULT_CACHE_CAPACITY};
pub use redis_cache::RedisCacheStore;
