//! LLM backend seam.
//!
//! One trait covers both deployment variants (local Ollama, hosted
//! Gemini). The backend is chosen once at composition time from config;
//! business logic only ever sees `Arc<dyn LlmBackend>`.

use async_trait::async_trait;
use thiserror::Error;

/// Default request timeout for generation (seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Sampling temperature used for both backends (low, favors determinism)
pub const TEMPERATURE: f32 = 0.3;

/// Default cap on generated output tokens
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 1024;

/// Failure from one backend round-trip.
///
/// The invoker never synthesizes fallback content and never returns a
/// silently empty string; the analysis pipeline catches these and applies
/// the fallback policy.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Backend not reachable (connect refused, DNS, timeout)
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    /// Backend reachable but the call failed (HTTP status, API error,
    /// empty or malformed envelope)
    #[error("backend error: {0}")]
    Backend(String),
}

/// One round-trip to a text-generation backend.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Human-readable backend name for logs and service metadata
    fn name(&self) -> &str;

    /// Send the prompt and return the raw textual output.
    async fn invoke(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Map a reqwest transport error onto the taxonomy.
///
/// Timeouts and connection failures are `Unavailable` (the service is not
/// answering); everything else is a `Backend` error.
pub(crate) fn map_transport_error(e: reqwest::Error) -> LlmError {
    if e.is_timeout() || e.is_connect() {
        LlmError::Unavailable(e.to_string())
    } else {
        LlmError::Backend(e.to_string())
    }
}
