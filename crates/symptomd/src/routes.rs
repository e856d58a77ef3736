//! API routes for symptomd.
//!
//! The /analyze endpoint prefers degraded-but-valid responses over
//! errors: only malformed client input (400) or an unexpected internal
//! fault (500) produce non-200 responses. Backend and parse failures are
//! absorbed by the fallback policy, and a store failure only nulls out
//! the query id.

use crate::analysis;
use crate::server::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use std::sync::Arc;
use symptom_common::config::BackendKind;
use symptom_common::gemini::GeminiClient;
use symptom_common::protocol::{
    AnalyzeResponse, HealthResponse, HistoryParams, HistoryResponse, ServiceInfo, DISCLAIMER,
};
use symptom_common::types::AnalysisRequest;
use tracing::{error, info, warn};

type AppStateArc = Arc<AppState>;

pub fn router(state: AppStateArc) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/analyze", post(analyze))
        .route("/history", get(history))
        .with_state(state)
}

async fn root(State(state): State<AppStateArc>) -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: "Symptom checker API is running".to_string(),
        status: "operational".to_string(),
        llm_backend: state.backend.name().to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn health(State(state): State<AppStateArc>) -> Json<HealthResponse> {
    // Key presence is only meaningful for the hosted variant
    let api_key_set = match state.backend_kind {
        BackendKind::Gemini => Some(GeminiClient::api_key_from_env().is_some()),
        BackendKind::Ollama => None,
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
        api_key_set,
    })
}

async fn analyze(
    State(state): State<AppStateArc>,
    Json(payload): Json<AnalysisRequest>,
) -> Result<Json<AnalyzeResponse>, (StatusCode, String)> {
    // Invalid request shape: 400, no backend call made
    let request = payload
        .validate()
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    info!("New analysis request ({} chars)", request.symptoms.len());

    let result = analysis::analyze(&state.backend, &request).await;

    // Persistence is best-effort; a failed save never fails the request
    let query_id = match state.store.save(&request, &result) {
        Ok(id) => Some(id),
        Err(e) => {
            warn!("Store save failed, continuing without query id: {}", e);
            None
        }
    };

    Ok(Json(AnalyzeResponse {
        conditions: result.conditions,
        recommendations: result.recommendations,
        disclaimer: DISCLAIMER.to_string(),
        timestamp: Utc::now(),
        query_id,
    }))
}

async fn history(
    State(state): State<AppStateArc>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<HistoryResponse>, (StatusCode, String)> {
    let queries = state.store.recent(params.limit).map_err(|e| {
        error!("History read failed: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("failed to retrieve history: {}", e),
        )
    })?;

    let count = queries.len();
    Ok(Json(HistoryResponse {
        queries,
        count,
        timestamp: Utc::now(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use symptom_common::fallback::FALLBACK_CONDITIONS;
    use symptom_common::llm::{LlmBackend, LlmError};
    use symptom_common::QueryStore;
    use tower::ServiceExt;

    /// Canned backend for router tests
    struct MockBackend {
        reply: Result<String, &'static str>,
    }

    #[async_trait]
    impl LlmBackend for MockBackend {
        fn name(&self) -> &str {
            "mock"
        }

        async fn invoke(&self, _prompt: &str) -> Result<String, LlmError> {
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(msg) => Err(LlmError::Unavailable(msg.to_string())),
            }
        }
    }

    fn test_app(reply: Result<&str, &'static str>) -> Router {
        let backend = Arc::new(MockBackend {
            reply: reply.map(str::to_string),
        });
        let store = Arc::new(QueryStore::open_in_memory().unwrap());
        router(Arc::new(AppState::new(backend, store, BackendKind::Ollama)))
    }

    fn analyze_request(body: &serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/analyze")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    const GOOD_REPLY: &str = r#"{"conditions": ["Common cold"], "recommendations": ["Rest"]}"#;

    #[tokio::test]
    async fn test_root_reports_backend() {
        let app = test_app(Ok(GOOD_REPLY));
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["llm_backend"], "mock");
        assert_eq!(json["status"], "operational");
    }

    #[tokio::test]
    async fn test_health() {
        let app = test_app(Ok(GOOD_REPLY));
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["status"], "healthy");
        // Local variant does not report a key flag
        assert!(json.get("api_key_set").is_none());
    }

    #[tokio::test]
    async fn test_analyze_happy_path() {
        let app = test_app(Ok(GOOD_REPLY));
        let body = serde_json::json!({"symptoms": "cough and fever", "age": 30});
        let response = app.oneshot(analyze_request(&body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["conditions"][0], "Common cold");
        assert_eq!(json["recommendations"][0], "Rest");
        assert!(json["disclaimer"].as_str().unwrap().contains("educational"));
        assert!(json["query_id"].as_i64().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_analyze_short_symptoms_rejected() {
        let app = test_app(Ok(GOOD_REPLY));
        let body = serde_json::json!({"symptoms": "ab"});
        let response = app.oneshot(analyze_request(&body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_analyze_age_bounds() {
        let app = test_app(Ok(GOOD_REPLY));
        let body = serde_json::json!({"symptoms": "cough", "age": 121});
        let response = app.clone().oneshot(analyze_request(&body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = serde_json::json!({"symptoms": "cough", "age": 120});
        let response = app.oneshot(analyze_request(&body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_analyze_backend_failure_still_200() {
        let app = test_app(Err("connection refused"));
        let body = serde_json::json!({"symptoms": "cough and fever"});
        let response = app.oneshot(analyze_request(&body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["conditions"][0], FALLBACK_CONDITIONS[0]);
        assert!(!json["recommendations"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_analyze_garbage_output_still_200() {
        let app = test_app(Ok("I cannot help with that"));
        let body = serde_json::json!({"symptoms": "cough and fever"});
        let response = app.oneshot(analyze_request(&body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["conditions"][0], FALLBACK_CONDITIONS[0]);
    }

    #[tokio::test]
    async fn test_analyze_store_failure_nulls_query_id() {
        // Build the schema, then reopen read-only so the insert fails
        let tmp = tempfile::NamedTempFile::new().unwrap();
        drop(QueryStore::open_at(tmp.path()).unwrap());
        let store = Arc::new(QueryStore::open_readonly(tmp.path()).unwrap());

        let backend = Arc::new(MockBackend {
            reply: Ok(GOOD_REPLY.to_string()),
        });
        let app = router(Arc::new(AppState::new(backend, store, BackendKind::Ollama)));

        let body = serde_json::json!({"symptoms": "cough and fever"});
        let response = app.oneshot(analyze_request(&body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert!(json["query_id"].is_null());
        assert_eq!(json["conditions"][0], "Common cold");
    }

    #[tokio::test]
    async fn test_history_order_and_count() {
        let app = test_app(Ok(GOOD_REPLY));

        for i in 0..3 {
            let body = serde_json::json!({"symptoms": format!("symptom number {}", i)});
            let response = app.clone().oneshot(analyze_request(&body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/history?limit=3")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["count"], 3);
        let queries = json["queries"].as_array().unwrap();
        assert_eq!(queries[0]["symptoms"], "symptom number 2");
        assert_eq!(queries[2]["symptoms"], "symptom number 0");
    }

    #[tokio::test]
    async fn test_history_default_limit() {
        let app = test_app(Ok(GOOD_REPLY));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/history")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["count"], 0);
        assert!(json["queries"].as_array().unwrap().is_empty());
    }
}
