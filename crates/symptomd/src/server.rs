//! HTTP server wiring for symptomd.

use crate::routes;
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use symptom_common::config::BackendKind;
use symptom_common::llm::LlmBackend;
use symptom_common::QueryStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Application state shared across handlers.
///
/// Everything is injected at startup; handlers hold no globals.
pub struct AppState {
    pub backend: Arc<dyn LlmBackend>,
    pub store: Arc<QueryStore>,
    pub backend_kind: BackendKind,
}

impl AppState {
    pub fn new(
        backend: Arc<dyn LlmBackend>,
        store: Arc<QueryStore>,
        backend_kind: BackendKind,
    ) -> Self {
        Self {
            backend,
            store,
            backend_kind,
        }
    }
}

/// Build the router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    routes::router(Arc::new(state))
        // Browser frontends run on arbitrary origins
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

/// Run the HTTP server until shutdown.
pub async fn run(state: AppState, bind_addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app(state)).await?;
    Ok(())
}
