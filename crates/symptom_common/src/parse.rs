//! Parsing and validation of raw LLM output.
//!
//! Models are told to emit bare JSON but still wrap it in markdown fences
//! or prose often enough that we strip those before parsing. A parse or
//! schema failure here is caught by the analysis pipeline and replaced
//! with the total fallback payload; an empty list inside an otherwise
//! valid reply only gets a per-list default (partial fallback).

use crate::types::AnalysisResult;
use serde::Deserialize;
use thiserror::Error;

/// Substituted when the model returns an empty conditions list
pub const EMPTY_CONDITIONS_MESSAGE: &str =
    "Unable to determine specific conditions; consult a healthcare provider.";

/// Substituted when the model returns an empty recommendations list
pub const EMPTY_RECOMMENDATIONS_MESSAGE: &str =
    "Consult a healthcare provider for personalized recommendations.";

/// Total parse/validation failure. Routed to the fallback policy.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Output is not a JSON object at all
    #[error("malformed response: {0}")]
    MalformedResponse(#[from] serde_json::Error),
    /// JSON parsed but the required keys are missing or mistyped
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
}

/// Expected shape of the model's reply
#[derive(Debug, Deserialize)]
struct RawAnalysis {
    conditions: Option<serde_json::Value>,
    recommendations: Option<serde_json::Value>,
}

/// Strip one leading/trailing markdown code fence, if present.
///
/// Idempotent: already-clean JSON text comes back unchanged.
pub fn strip_code_fence(text: &str) -> &str {
    let t = text.trim();
    let Some(rest) = t.strip_prefix("```") else {
        return t;
    };
    // Drop the info string ("json") on the opening fence line
    let rest = match rest.split_once('\n') {
        Some((_lang, body)) => body,
        None => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Parse raw backend text into a validated [`AnalysisResult`].
pub fn parse_analysis(raw: &str) -> Result<AnalysisResult, ParseError> {
    let cleaned = strip_code_fence(raw);

    let parsed: RawAnalysis = serde_json::from_str(cleaned)?;

    let conditions = string_list(parsed.conditions, "conditions")?;
    let recommendations = string_list(parsed.recommendations, "recommendations")?;

    // Partial fallback: an empty list gets a single default message
    // instead of failing the whole result
    let conditions = if conditions.is_empty() {
        vec![EMPTY_CONDITIONS_MESSAGE.to_string()]
    } else {
        conditions
    };
    let recommendations = if recommendations.is_empty() {
        vec![EMPTY_RECOMMENDATIONS_MESSAGE.to_string()]
    } else {
        recommendations
    };

    Ok(AnalysisResult {
        conditions,
        recommendations,
    })
}

/// Require `value` to be a JSON array of strings
fn string_list(value: Option<serde_json::Value>, key: &str) -> Result<Vec<String>, ParseError> {
    let Some(value) = value else {
        return Err(ParseError::InvalidSchema(format!("missing key '{}'", key)));
    };
    let serde_json::Value::Array(items) = value else {
        return Err(ParseError::InvalidSchema(format!(
            "key '{}' is not a list",
            key
        )));
    };

    items
        .into_iter()
        .map(|item| match item {
            serde_json::Value::String(s) => Ok(s),
            other => Err(ParseError::InvalidSchema(format!(
                "key '{}' contains a non-string entry: {}",
                key, other
            ))),
        })
        .collect()
}
