//! HTTP wire types shared by the daemon and the CLI.

use crate::types::QueryRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fixed disclaimer appended to every successful analysis response.
/// Never model-generated.
pub const DISCLAIMER: &str = "IMPORTANT MEDICAL DISCLAIMER: This tool is for educational purposes \
     only and is not a substitute for professional medical advice. Always consult with a \
     qualified healthcare provider.";

/// Response for `GET /`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub message: String,
    pub status: String,
    pub llm_backend: String,
    pub version: String,
}

/// Response for `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    /// Only reported for the hosted variant
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_set: Option<bool>,
}

/// Response for `POST /analyze`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub conditions: Vec<String>,
    pub recommendations: Vec<String>,
    pub disclaimer: String,
    pub timestamp: DateTime<Utc>,
    /// Null when persistence failed; the analysis itself still succeeded
    pub query_id: Option<i64>,
}

/// Query string for `GET /history`
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryParams {
    #[serde(default = "default_history_limit")]
    pub limit: usize,
}

fn default_history_limit() -> usize {
    10
}

/// Response for `GET /history`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub queries: Vec<QueryRecord>,
    pub count: usize,
    pub timestamp: DateTime<Utc>,
}
