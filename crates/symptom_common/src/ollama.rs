//! Ollama local LLM client.
//!
//! HTTP client for a locally running Ollama server. No cloud calls.
//!
//! Endpoints used:
//! - GET / - health check
//! - GET /api/tags - list available models
//! - POST /api/generate - generate response (non-streaming, JSON format)

use crate::llm::{map_transport_error, LlmBackend, LlmError, TEMPERATURE};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default Ollama API endpoint
pub const OLLAMA_DEFAULT_URL: &str = "http://127.0.0.1:11434";

/// Default model for symptom analysis
pub const OLLAMA_DEFAULT_MODEL: &str = "llama3:8b";

/// Timeout for health checks (ms)
const HEALTH_CHECK_TIMEOUT_MS: u64 = 2000;

/// Request for /api/generate
#[derive(Debug, Clone, Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    /// "json" constrains Ollama to emit a single JSON object
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerateOptions>,
}

/// Generation options
#[derive(Debug, Clone, Serialize, Default)]
struct GenerateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<i32>,
}

/// Response from /api/generate (non-streaming)
#[derive(Debug, Clone, Deserialize)]
struct GenerateResponse {
    response: String,
    #[serde(default)]
    done: bool,
}

/// Response from /api/tags
#[derive(Debug, Clone, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagModel>,
}

#[derive(Debug, Clone, Deserialize)]
struct TagModel {
    name: String,
}

/// Ollama client for local symptom analysis
#[derive(Debug, Clone)]
pub struct OllamaClient {
    base_url: String,
    model: String,
    timeout: Duration,
    max_output_tokens: u32,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: &str, timeout: Duration, max_output_tokens: u32) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            timeout,
            max_output_tokens,
        }
    }

    /// Check if the Ollama server is reachable
    pub async fn is_available(&self) -> bool {
        let client = match reqwest::Client::builder()
            .timeout(Duration::from_millis(HEALTH_CHECK_TIMEOUT_MS))
            .build()
        {
            Ok(c) => c,
            Err(_) => return false,
        };

        match client.get(&self.base_url).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    /// List locally available model names
    pub async fn list_models(&self) -> Result<Vec<String>, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(HEALTH_CHECK_TIMEOUT_MS))
            .build()
            .map_err(|e| LlmError::Backend(e.to_string()))?;

        let url = format!("{}/api/tags", self.base_url);
        let resp = client.get(&url).send().await.map_err(map_transport_error)?;

        if !resp.status().is_success() {
            return Err(LlmError::Backend(format!("status: {}", resp.status())));
        }

        let tags: TagsResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Backend(e.to_string()))?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// Configured model identifier
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl LlmBackend for OllamaClient {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn invoke(&self, prompt: &str) -> Result<String, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| LlmError::Backend(e.to_string()))?;

        let request = GenerateRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            stream: false,
            format: Some("json".to_string()),
            options: Some(GenerateOptions {
                temperature: Some(TEMPERATURE),
                num_predict: Some(self.max_output_tokens as i32),
            }),
        };

        let url = format!("{}/api/generate", self.base_url);
        let resp = client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(map_transport_error)?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::Backend(format!("status {}: {}", status, body)));
        }

        let generated: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Backend(e.to_string()))?;

        if !generated.done || generated.response.trim().is_empty() {
            return Err(LlmError::Backend("empty generation response".to_string()));
        }

        Ok(generated.response)
    }
}
