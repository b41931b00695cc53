//! Jobserver process entry point

use std::sync::Arc;

use shared::logging;
use tokio::signal;

use jobserver::{
    Args, CacheBackend, CacheStore, DocumentStore, JobServer, JobServerResult, JsonDocumentStore,
    MemoryCacheStore, RedisCacheStore, ServerConfig,
};

const COMPONENT: &str = "main";

#[tokio::main]
async fn main() -> JobServerResult<()> {
    let args = Args::from_env();
    logging::init_tracing_with_level(Some(&args.log_level));

    let config = ServerConfig::try_from(args)?;
    logging::log_startup(COMPONENT, &format!("job server on {}", config.bind_address));

    let documents = JsonDocumentStore::load(&config.data_path).await?;
    documents.ping().await?;
    logging::log_success(COMPONENT, &format!("Document store ready ({} jobs)", documents.len()));

    let result = match config.cache_backend {
        CacheBackend::Memory => {
            let cache = MemoryCacheStore::with_capacity(config.cache_capacity);
            serve_with(config, documents, cache).await
        }
        CacheBackend::Redis => {
            let cache = RedisCacheStore::connect(&config.redis_url).await?;
            serve_with(config, documents, cache).await
        }
    };

    if let Err(e) = result {
        logging::log_error(COMPONENT, "Job server", &e);
        return Err(e);
    }

    logging::log_success(COMPONENT, "Job server stopped gracefully");
    Ok(())
}

/// Check the cache is reachable, then serve until Ctrl+C
async fn serve_with<C>(config: ServerConfig, documents: JsonDocumentStore, cache: C) -> JobServerResult<()>
where
    C: CacheStore + 'static,
{
    cache.ping().await?;
    shared::service_info!(
        COMPONENT,
        backend = ?config.cache_backend,
        "Cache ready, entries live for {:?}",
        config.cache_ttl
    );

    let server = JobServer::new(config, Arc::new(documents), Arc::new(cache));

    let shutdown = async {
        match signal::ctrl_c().await {
            Ok(()) => logging::log_shutdown(COMPONENT, "Received Ctrl+C signal"),
            Err(err) => {
                logging::log_error(COMPONENT, "Signal handling", &err);
                // Without a signal handler, run until the process is killed
                std::future::pending::<()>().await
            }
        }
    };

    server.run(shutdown).await
}
