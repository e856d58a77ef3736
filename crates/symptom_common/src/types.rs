//! Domain types for symptom analysis.
//!
//! Request validation is an explicit function rather than annotations on
//! the fields: constraints live here as named constants and `validate()`
//! returns a typed error the HTTP layer maps to a 400.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum symptom description length (after trimming)
pub const SYMPTOMS_MIN_LEN: usize = 3;

/// Maximum symptom description length (after trimming)
pub const SYMPTOMS_MAX_LEN: usize = 1000;

/// Minimum accepted patient age
pub const AGE_MIN: u32 = 0;

/// Maximum accepted patient age
pub const AGE_MAX: u32 = 120;

/// Gender values accepted by request validation (compared lowercase)
pub const ACCEPTED_GENDERS: &[&str] = &["male", "female", "other", "m", "f"];

/// One symptom analysis request, as received over HTTP.
///
/// Lives only for the duration of a single request. Call [`validate`]
/// before doing anything else with it; the validated form has trimmed
/// symptoms and a lowercased gender.
///
/// [`validate`]: AnalysisRequest::validate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub symptoms: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub gender: Option<String>,
}

/// Request shape violation. Maps to HTTP 400; no backend call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("symptoms must be {SYMPTOMS_MIN_LEN}-{SYMPTOMS_MAX_LEN} characters, got {0}")]
    SymptomsLength(usize),
    #[error("age must be {AGE_MIN}-{AGE_MAX}, got {0}")]
    AgeOutOfRange(u32),
    #[error("gender must be male, female, or other")]
    InvalidGender,
}

impl AnalysisRequest {
    /// Validate and normalize the request in place.
    ///
    /// Trims the symptom text and lowercases the gender. Length bounds
    /// apply to the trimmed text.
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        let trimmed = self.symptoms.trim();
        let len = trimmed.chars().count();
        if !(SYMPTOMS_MIN_LEN..=SYMPTOMS_MAX_LEN).contains(&len) {
            return Err(ValidationError::SymptomsLength(len));
        }
        self.symptoms = trimmed.to_string();

        if let Some(age) = self.age {
            if age > AGE_MAX {
                return Err(ValidationError::AgeOutOfRange(age));
            }
        }

        if let Some(gender) = self.gender.take() {
            let g = gender.trim().to_lowercase();
            if !ACCEPTED_GENDERS.contains(&g.as_str()) {
                return Err(ValidationError::InvalidGender);
            }
            self.gender = Some(g);
        }

        Ok(self)
    }
}

/// The canonical analysis shape.
///
/// Invariant: whenever one of these reaches a caller, both lists are
/// non-empty. The parser substitutes per-list defaults for empty lists
/// and the fallback policy covers everything else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub conditions: Vec<String>,
    pub recommendations: Vec<String>,
}

/// One persisted request/result pair, as read back from the query store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRecord {
    pub id: i64,
    pub symptoms: String,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub conditions: Vec<String>,
    pub recommendations: Vec<String>,
    pub created_at: DateTime<Utc>,
}
