//! Jobserver state management
//!
//! Runtime configuration plus the counters reported by the health endpoint.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crate::config::ServerConfig;
use crate::core::Resolution;

/// Core jobserver state
#[derive(Debug)]
pub struct ServerState {
    pub config: ServerConfig,
    pub server_start_time: Instant,
    cache_hits: AtomicU64,
    scans: AtomicU64,
    failures: AtomicU64,
}

impl ServerState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            server_start_time: Instant::now(),
            cache_hits: AtomicU64::new(0),
            scans: AtomicU64::new(0),
            failures: AtomicU64::new(0),
        }
    }

    /// Get server uptime in seconds
    pub fn get_uptime_seconds(&self) -> u64 {
        self.server_start_time.elapsed().as_secs()
    }

    /// Count one resolved request by where its answer came from
    pub fn record_resolution(&self, resolution: Resolution) {
        match resolution {
            Resolution::CacheHit => self.cache_hits.fetch_add(1, Ordering::Relaxed),
            Resolution::Scanned => self.scans.fetch_add(1, Ordering::Relaxed),
        };
    }

    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cache_hits(&self) -> u64 {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn scans(&self) -> u64 {
        self.scans.load(Ordering::Relaxed)
    }

    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}
