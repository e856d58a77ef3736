//! Fallback policy: the terminal safety net.
//!
//! Applied when the backend call fails or its output cannot be parsed
//! into a valid result. Always produces a complete, non-empty payload
//! and never fails itself.

use crate::types::AnalysisResult;

/// Conditions text for the fallback payload
pub const FALLBACK_CONDITIONS: &[&str] =
    &["Unable to complete the symptom analysis due to a technical issue."];

/// Recommendations text for the fallback payload
pub const FALLBACK_RECOMMENDATIONS: &[&str] = &[
    "Consult a healthcare provider directly about your symptoms.",
    "If your symptoms are severe or worsening, seek immediate medical care.",
    "Try again in a few minutes; the analysis service may be temporarily unavailable.",
];

/// Fixed safe result returned when analysis cannot be completed.
pub fn fallback_result() -> AnalysisResult {
    AnalysisResult {
        conditions: FALLBACK_CONDITIONS.iter().map(|s| s.to_string()).collect(),
        recommendations: FALLBACK_RECOMMENDATIONS
            .iter()
            .map(|s| s.to_string())
            .collect(),
    }
}
