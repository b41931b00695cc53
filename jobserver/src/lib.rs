//! Jobserver library for the job attribute service
//!
//! Serves job documents and the distinct values of their delimited
//! attributes, answering repeated requests from a TTL-bounded cache.

pub mod config;
pub mod core;
pub mod error;
pub mod server_impl;
pub mod services;
pub mod state;
pub mod traits;

// Re-export main types
pub use config::{Args, CacheBackend, ServerConfig};
pub use core::{AttributeScanner, Resolution, UniqueValuesResolver, ValueSetCache};
pub use error::{JobServerError, JobServerResult};
pub use server_impl::JobServer;
pub use state::ServerState;

// Re-export trait definitions
pub use traits::{CacheStore, DocumentCursor, DocumentStore};

// Re-export service implementations
pub use services::{JsonDocumentStore, MemoryCacheStore, RedisCacheStore};
