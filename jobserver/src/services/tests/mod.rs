//! Service tests for jobserver
//!
//! This module contains tests for the backing-service implementations.

pub mod helpers;
