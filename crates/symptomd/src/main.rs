//! Symptom checker daemon.
//!
//! Educational HTTP service: takes a free-text symptom description,
//! asks a configured LLM backend for possible conditions and next steps,
//! and records each exchange in a local SQLite store.
//!
//! Startup is phased: logging, config load, config validation (fatal on
//! missing hosted credentials), store init, backend construction, serve.
//! Nothing is initialized at import time and nothing calls process::exit
//! from request handling.

mod analysis;
mod routes;
mod server;

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use symptom_common::config::{BackendKind, Config};
use symptom_common::gemini::GeminiClient;
use symptom_common::llm::LlmBackend;
use symptom_common::ollama::OllamaClient;
use symptom_common::QueryStore;
use tracing::{info, Level};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    info!("symptomd v{} starting", env!("CARGO_PKG_VERSION"));

    let config = Config::load()?;
    config.validate()?;
    info!("Config validated, backend: {:?}", config.backend);

    let store = QueryStore::open_at(&config.db_path)?;
    info!("Query store ready at {}", config.db_path);

    let backend = build_backend(&config)?;
    info!("LLM backend '{}' constructed", backend.name());

    let state = server::AppState::new(backend, Arc::new(store), config.backend);
    server::run(state, &config.bind_addr).await
}

/// Construct the configured backend client. The choice is made exactly
/// once, here; handlers only see the trait object.
fn build_backend(config: &Config) -> Result<Arc<dyn LlmBackend>> {
    let timeout = Duration::from_secs(config.llm.timeout_secs);
    match config.backend {
        BackendKind::Ollama => Ok(Arc::new(OllamaClient::new(
            &config.llm.ollama_url,
            &config.llm.ollama_model,
            timeout,
            config.llm.max_output_tokens,
        ))),
        BackendKind::Gemini => {
            // validate() already confirmed the key is present
            let api_key = GeminiClient::api_key_from_env()
                .ok_or_else(|| anyhow::anyhow!("GEMINI_API_KEY disappeared after validation"))?;
            Ok(Arc::new(GeminiClient::new(
                &api_key,
                &config.llm.gemini_model,
                timeout,
                config.llm.max_output_tokens,
            )))
        }
    }
}
