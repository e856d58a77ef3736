//! Gemini hosted LLM client.
//!
//! Cloud variant of the backend seam. The API key comes from the
//! `GEMINI_API_KEY` environment variable and is checked at startup by
//! config validation, never per request.

use crate::llm::{map_transport_error, LlmBackend, LlmError, TEMPERATURE};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable holding the API key
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Default hosted model
pub const GEMINI_DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Generate endpoint base
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

/// Gemini client for hosted symptom analysis
#[derive(Debug, Clone)]
pub struct GeminiClient {
    api_key: String,
    model: String,
    timeout: Duration,
    max_output_tokens: u32,
}

impl GeminiClient {
    pub fn new(api_key: &str, model: &str, timeout: Duration, max_output_tokens: u32) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            timeout,
            max_output_tokens,
        }
    }

    /// Read the API key from the process environment
    pub fn api_key_from_env() -> Option<String> {
        std::env::var(GEMINI_API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }
}

#[async_trait]
impl LlmBackend for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn invoke(&self, prompt: &str) -> Result<String, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| LlmError::Backend(e.to_string()))?;

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                max_output_tokens: self.max_output_tokens,
            },
        };

        let url = format!(
            "{}/{}:generateContent?key={}",
            GEMINI_API_BASE, self.model, self.api_key
        );
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

        let envelope: GenerateContentResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Backend(e.to_string()))?;

        let text: String = envelope
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| {
                c.parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(LlmError::Backend("no candidates in response".to_string()));
        }

        Ok(text)
    }
}
