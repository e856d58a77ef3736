//! Prompt building for symptom analysis.
//!
//! Pure string construction: patient context plus a fixed instruction
//! template with strict output-format rules. Both backends get the same
//! prompt; the format rules are what make the parser's job tractable.

use crate::types::AnalysisRequest;

/// Output-format rules suffix (constant, always included)
const OUTPUT_RULES: &str = r#"IMPORTANT RULES:
- Your response MUST be ONLY a valid JSON object.
- The JSON object must have exactly two keys: "conditions" (a list of strings) and "recommendations" (a list of strings).
- DO NOT include any text, greetings, or markdown formatting like ```json before or after the JSON object.
- This is for educational purposes only. Do not provide a definitive diagnosis. Emphasize consulting a real doctor."#;

/// Build the analysis prompt for a validated request.
///
/// Embeds the symptom text and any demographics as plain context lines
/// and asks for 3-5 conditions (most to least likely, each with a short
/// explanation) plus 5-7 next steps. Never fails.
pub fn build_prompt(request: &AnalysisRequest) -> String {
    let mut context = format!("Patient Symptoms: {}", request.symptoms);
    if let Some(age) = request.age {
        context.push_str(&format!(", Age: {}", age));
    }
    if let Some(gender) = &request.gender {
        context.push_str(&format!(", Gender: {}", gender));
    }

    format!(
        r#"You are a helpful medical education assistant. Your task is to analyze the user's symptoms and provide a structured JSON response.

Based on the following information: '{context}'

1. List 3 to 5 possible conditions, from most to least likely, each with a brief 1-2 sentence explanation.
2. Provide a list of 5 to 7 recommended next steps.

{OUTPUT_RULES}"#
    )
}
