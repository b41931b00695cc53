//! Command line and environment configuration
//!
//! Every flag can also be supplied through the environment; a `.env` file in
//! the working directory (or a parent) is loaded first if present.

use clap::{Parser, ValueEnum};
use shared::SharedError;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{JobServerError, JobServerResult};
use crate::services::DEFAULT_CACHE_CAPACITY;

/// Where distinct-value sets are cached
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackend {
    /// In-process Moka cache, private to this server
    Memory,
    /// Shared Redis server
    Redis,
}

/// Command line arguments
#[derive(Parser, Debug, Clone)]
#[command(name = "jobserver")]
#[command(about = "Serves job postings and the distinct values of their attributes")]
pub struct Args {
    /// Address to bind the HTTP server to
    #[arg(long, env = "JOBS_HOST", default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// Port for the HTTP server
    #[arg(long, env = "JOBS_PORT", default_value = "8080")]
    pub port: u16,

    /// Job collection file (JSON array or JSON lines)
    #[arg(long, env = "JOBS_DATA_PATH", default_value = "./data/jobs.json")]
    pub data_path: PathBuf,

    /// Lifetime of cached distinct-value sets, in seconds
    #[arg(long, env = "JOBS_CACHE_TTL_SECS", default_value = "24")]
    pub cache_ttl_secs: u64,

    /// Cache backend holding distinct-value sets
    #[arg(long, env = "JOBS_CACHE_BACKEND", value_enum, default_value = "memory")]
    pub cache_backend: CacheBackend,

    /// Most entries the in-process cache holds
    #[arg(long, env = "JOBS_CACHE_CAPACITY", default_value_t = DEFAULT_CACHE_CAPACITY)]
    pub cache_capacity: u64,

    /// Redis server used by the redis cache backend
    #[arg(long, env = "JOBS_REDIS_URL", default_value = "redis://localhost:6379/0")]
    pub redis_url: String,

    /// Deadline for a single request, in seconds
    #[arg(long, env = "JOBS_REQUEST_TIMEOUT_SECS", default_value = "30")]
    pub request_timeout_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "JOBS_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Parse arguments after loading `.env`, if any
    pub fn from_env() -> Self {
        // Missing .env is fine
        let _ = dotenv::dotenv();
        Self::parse()
    }
}

/// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: SocketAddr,
    pub data_path: PathBuf,
    pub cache_ttl: Duration,
    pub cache_backend: CacheBackend,
    pub cache_capacity: u64,
    pub redis_url: String,
    pub request_timeout: Duration,
    pub log_level: String,
}

impl ServerConfig {
    /// Check values that cannot work at runtime
    pub fn validate(&self) -> JobServerResult<()> {
        if self.cache_ttl.is_zero() {
            return Err(invalid("cache_ttl", &self.cache_ttl));
        }
        if self.request_timeout.is_zero() {
            return Err(invalid("request_timeout", &self.request_timeout));
        }
        if self.cache_backend == CacheBackend::Memory && self.cache_capacity == 0 {
            return Err(invalid("cache_capacity", &self.cache_capacity));
        }
        Ok(())
    }
}

fn invalid(field: &str, value: &dyn std::fmt::Debug) -> JobServerError {
    SharedError::InvalidConfig {
        field: field.to_string(),
        value: format!("{:?}", value),
    }
    .into()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 8080)),
            data_path: PathBuf::from("./data/jobs.json"),
            cache_ttl: Duration::from_secs(24),
            cache_backend: CacheBackend::Memory,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            redis_url: "redis://localhost:6379/0".to_string(),
            request_timeout: Duration::from_secs(30),
            log_level: "info".to_string(),
        }
    }
}

impl TryFrom<Args> for ServerConfig {
    type Error = JobServerError;

    fn try_from(args: Args) -> Result<Self, Self::Error> {
        let config = Self {
            bind_address: SocketAddr::new(args.host, args.port),
            data_path: args.data_path,
            cache_ttl: Duration::from_secs(args.cache_ttl_secs),
            cache_backend: args.cache_backend,
            cache_capacity: args.cache_capacity,
            redis_url: args.redis_url,
            request_timeout: Duration::from_secs(args.request_timeout_secs),
            log_level: args.log_level,
        };
        config.validate()?;
        Ok(config)
    }
}
