//! Analysis pipeline: prompt, invoke, parse, fall back.
//!
//! This function never fails. Backend and parse failures are logged and
//! replaced with the fixed fallback payload, so the caller always gets a
//! result with non-empty conditions and recommendations.

use std::sync::Arc;
use symptom_common::llm::LlmBackend;
use symptom_common::prompt::build_prompt;
use symptom_common::types::{AnalysisRequest, AnalysisResult};
use symptom_common::{fallback_result, parse_analysis};
use tracing::{info, warn};

pub async fn analyze(backend: &Arc<dyn LlmBackend>, request: &AnalysisRequest) -> AnalysisResult {
    let prompt = build_prompt(request);

    let raw = match backend.invoke(&prompt).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Backend '{}' failed, using fallback: {}", backend.name(), e);
            return fallback_result();
        }
    };

    match parse_analysis(&raw) {
        Ok(result) => {
            info!(
                "Analysis complete: {} conditions, {} recommendations",
                result.conditions.len(),
                result.recommendations.len()
            );
            result
        }
        Err(e) => {
            warn!("Unusable backend output, using fallback: {}", e);
            fallback_result()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use symptom_common::fallback::FALLBACK_CONDITIONS;
    use symptom_common::llm::LlmError;

    /// Canned backend for pipeline tests
    struct MockBackend {
        reply: Result<&'static str, &'static str>,
    }

    #[async_trait]
    impl LlmBackend for MockBackend {
        fn name(&self) -> &str {
            "mock"
        }

        async fn invoke(&self, _prompt: &str) -> Result<String, LlmError> {
            match self.reply {
                Ok(text) => Ok(text.to_string()),
                Err(msg) => Err(LlmError::Unavailable(msg.to_string())),
            }
        }
    }

    fn request() -> AnalysisRequest {
        AnalysisRequest {
            symptoms: "sore throat".to_string(),
            age: None,
            gender: None,
        }
    }

    fn backend(reply: Result<&'static str, &'static str>) -> Arc<dyn LlmBackend> {
        Arc::new(MockBackend { reply })
    }

    #[tokio::test]
    async fn test_valid_output_passes_through() {
        let backend = backend(Ok(r#"{"conditions": ["a"], "recommendations": ["b"]}"#));
        let result = analyze(&backend, &request()).await;
        assert_eq!(result.conditions, vec!["a"]);
        assert_eq!(result.recommendations, vec!["b"]);
    }

    #[tokio::test]
    async fn test_backend_failure_yields_fallback() {
        let backend = backend(Err("connection refused"));
        let result = analyze(&backend, &request()).await;
        assert_eq!(result.conditions, FALLBACK_CONDITIONS);
        assert!(!result.recommendations.is_empty());
    }

    #[tokio::test]
    async fn test_unparseable_output_yields_fallback() {
        let backend = backend(Ok("I cannot help with that"));
        let result = analyze(&backend, &request()).await;
        assert_eq!(result.conditions, FALLBACK_CONDITIONS);
    }
}
