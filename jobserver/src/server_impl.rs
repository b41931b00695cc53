//! Main jobserver implementation
//!
//! The JobServer struct wires the injected document and cache stores into
//! the resolver and exposes them over HTTP.

use std::future::Future;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::Json,
    routing::get,
    Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use shared::{AttributeKey, DocumentId, JOB_SKILLS_FIELD};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::core::UniqueValuesResolver;
use crate::error::{JobServerError, JobServerResult};
use crate::state::ServerState;
use crate::traits::{CacheStore, DocumentStore};

const COMPONENT: &str = "server";

/// Field every distinct-value response is returned under, whatever the attribute
const UNIQUE_VALUES_FIELD: &str = "job_skills";

/// Main jobserver struct with dependency injection
pub struct JobServer<D: DocumentStore, C: CacheStore> {
    state: Arc<ServerState>,
    documents: Arc<D>,
    resolver: UniqueValuesResolver<D, C>,
}

impl<D: DocumentStore, C: CacheStore> Clone for JobServer<D, C> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            documents: self.documents.clone(),
            resolver: self.resolver.clone(),
        }
    }
}

impl<D, C> JobServer<D, C>
where
    D: DocumentStore + 'static,
    C: CacheStore + 'static,
{
    /// Create a new jobserver with dependency injection
    pub fn new(config: ServerConfig, documents: Arc<D>, cache: Arc<C>) -> Self {
        let resolver = UniqueValuesResolver::new(documents.clone(), cache, config.cache_ttl);
        Self {
            state: Arc::new(ServerState::new(config)),
            documents,
            resolver,
        }
    }

    /// Build the Axum router with all routes
    pub fn build_router(&self) -> Router {
        Router::new()
            .route("/", get(index_handler))
            .route("/health", get(health_check::<D, C>))
            .route("/jobs/skills", get(skills_handler::<D, C>))
            .route("/jobs/countries", get(countries_handler::<D, C>))
            .route("/jobs/:id", get(job_by_id_handler::<D, C>))
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(CorsLayer::permissive())
                    .into_inner(),
            )
            .with_state(self.clone())
    }

    /// Bind the configured address and serve until `shutdown` resolves
    pub async fn run<F>(&self, shutdown: F) -> JobServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let address = self.state.config.bind_address;
        let listener = TcpListener::bind(address)
            .await
            .map_err(|e| JobServerError::ServerStartup(format!("Failed to bind to {}: {}", address, e)))?;

        shared::service_info!(COMPONENT, "🌐 Job server listening on http://{}", address);
        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> JobServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(listener, self.build_router())
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }

    /// Get server state for external access
    pub fn state(&self) -> &Arc<ServerState> {
        &self.state
    }

    /// Resolve `key` under the request deadline and render it as `{"job_skills": [...]}`
    async fn unique_values(&self, key: AttributeKey) -> Result<Json<Value>, JobServerError> {
        let cancel = CancellationToken::new();
        // Dropping the request future cancels any scan still in flight
        let _cancel_on_drop = cancel.clone().drop_guard();
        let deadline = self.state.config.request_timeout;

        let resolved = tokio::time::timeout(deadline, self.resolver.resolve_traced(&key, &cancel))
            .await
            .map_err(|_| {
                cancel.cancel();
                JobServerError::Timeout { after: deadline }
            })
            .and_then(|result| result);

        let (values, resolution) = match resolved {
            Ok(resolved) => resolved,
            Err(e) => {
                self.state.record_failure();
                shared::logging::log_error(COMPONENT, &format!("Resolving {}", key), &e);
                return Err(e);
            }
        };
        self.state.record_resolution(resolution);

        Ok(Json(json!({ UNIQUE_VALUES_FIELD: values.into_sorted_vec() })))
    }
}

// HTTP Handlers

async fn index_handler() -> Json<Value> {
    Json(json!({ "message": "Hello World" }))
}

/// Distinct skills across all jobs
async fn skills_handler<D, C>(
    State(server): State<JobServer<D, C>>,
) -> Result<Json<Value>, JobServerError>
where
    D: DocumentStore + 'static,
    C: CacheStore + 'static,
{
    server.unique_values(AttributeKey::job_skills()).await
}

/// Distinct countries across all jobs
async fn countries_handler<D, C>(
    State(server): State<JobServer<D, C>>,
) -> Result<Json<Value>, JobServerError>
where
    D: DocumentStore + 'static,
    C: CacheStore + 'static,
{
    server.unique_values(AttributeKey::search_country()).await
}

/// Skill field of a single job
async fn job_by_id_handler<D, C>(
    State(server): State<JobServer<D, C>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, JobServerError>
where
    D: DocumentStore + 'static,
    C: CacheStore + 'static,
{
    let id = DocumentId::parse(&id)?;

    let document = server.documents.find_by_id(&id).await.map_err(|e| {
        server.state.record_failure();
        shared::logging::log_error(COMPONENT, &format!("Looking up job {}", id), &e);
        e
    })?;
    let document = document.ok_or_else(|| JobServerError::DocumentNotFound { id: id.to_string() })?;

    let skill = document
        .get(JOB_SKILLS_FIELD)
        .cloned()
        .ok_or_else(|| JobServerError::FieldNotFound { field: "job_skill".to_string() })?;

    Ok(Json(json!({ "job_skill": skill })))
}

/// Health check endpoint
async fn health_check<D, C>(State(server): State<JobServer<D, C>>) -> Json<Value>
where
    D: DocumentStore + 'static,
    C: CacheStore + 'static,
{
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "uptime_seconds": server.state.get_uptime_seconds(),
        "cache_hits": server.state.cache_hits(),
        "scans": server.state.scans(),
        "failures": server.state.failures()
    }))
}
