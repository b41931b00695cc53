//! Core read pipeline
//!
//! Scanner, cache adapter and the resolver that composes them. All I/O goes
//! through the traits in [`crate::traits`].

pub mod resolver;
pub mod scanner;
pub mod value_cache;

// Re-export commonly used types
pub use resolver::{Resolution, UniqueValuesResolver};
pub use scanner::AttributeScanner;
pub use value_cache::ValueSetCache;
