//! Fixtures and helpers shared by the jobserver integration tests

#![allow(dead_code)]

pub mod fixtures;
pub mod helpers;
