//! Shared library for the symptom checker service.
//!
//! Holds everything both the daemon (`symptomd`) and the operator CLI
//! (`symptomctl`) need: domain types and request validation, the prompt
//! builder, the pluggable LLM backend clients, response parsing with its
//! fallback policy, the SQLite query store, and service configuration.

pub mod config;
pub mod fallback;
pub mod gemini;
pub mod llm;
pub mod ollama;
pub mod parse;
pub mod prompt;
pub mod protocol;
pub mod store;
pub mod types;

pub use config::Config;
pub use fallback::fallback_result;
pub use llm::{LlmBackend, LlmError};
pub use parse::{parse_analysis, ParseError};
pub use store::QueryStore;
pub use types::{AnalysisRequest, AnalysisResult, QueryRecord, ValidationError};
