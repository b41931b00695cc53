//! Shared types for the job attribute service
//!
//! Contains the identifiers and value types passed between the HTTP layer,
//! the cache and the document scanner, plus the logging utilities every
//! component uses.

pub mod errors;
pub mod logging;
pub mod types;

pub use errors::*;
pub use types::*;
