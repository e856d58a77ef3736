//! Configuration management for symptomd.
//!
//! Loads settings from symptomd.toml (path overridable via
//! `SYMPTOMD_CONFIG`) or uses defaults. Credentials come from the
//! process environment, never from the config file.

use crate::gemini::{GeminiClient, GEMINI_API_KEY_ENV, GEMINI_DEFAULT_MODEL};
use crate::llm::{DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_TIMEOUT_SECS};
use crate::ollama::{OLLAMA_DEFAULT_MODEL, OLLAMA_DEFAULT_URL};
use crate::store::DEFAULT_DB_PATH;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

/// Default config file path
pub const CONFIG_PATH: &str = "symptomd.toml";

/// Environment variable overriding the config file path
pub const CONFIG_PATH_ENV: &str = "SYMPTOMD_CONFIG";

/// Which LLM backend variant to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Local Ollama server (default; no credentials needed)
    #[default]
    Ollama,
    /// Hosted Gemini API (requires GEMINI_API_KEY)
    Gemini,
}

/// LLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of the local Ollama server
    #[serde(default = "default_ollama_url")]
    pub ollama_url: String,

    /// Model identifier for the local variant
    #[serde(default = "default_ollama_model")]
    pub ollama_model: String,

    /// Model identifier for the hosted variant
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,

    /// Backend request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Cap on generated output tokens
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

fn default_ollama_url() -> String {
    OLLAMA_DEFAULT_URL.to_string()
}

fn default_ollama_model() -> String {
    OLLAMA_DEFAULT_MODEL.to_string()
}

fn default_gemini_model() -> String {
    GEMINI_DEFAULT_MODEL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_max_output_tokens() -> u32 {
    DEFAULT_MAX_OUTPUT_TOKENS
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            ollama_url: default_ollama_url(),
            ollama_model: default_ollama_model(),
            gemini_model: default_gemini_model(),
            timeout_secs: default_timeout_secs(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

/// Service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Backend variant, fixed at startup
    #[serde(default)]
    pub backend: BackendKind,

    /// HTTP bind address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// SQLite database path
    #[serde(default = "default_db_path")]
    pub db_path: String,

    #[serde(default)]
    pub llm: LlmConfig,
}

fn default_bind_addr() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_db_path() -> String {
    DEFAULT_DB_PATH.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            bind_addr: default_bind_addr(),
            db_path: default_db_path(),
            llm: LlmConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from disk, falling back to defaults when the
    /// file does not exist.
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| CONFIG_PATH.to_string());
        Self::load_from(&path)
    }

    /// Load from a specific path (missing file means defaults).
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let config: Config =
            toml::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Startup-time gate: missing credentials for the hosted variant are
    /// a fatal error reported to the operator before serving begins.
    pub fn validate(&self) -> Result<()> {
        if self.llm.timeout_secs == 0 {
            bail!("llm.timeout_secs must be non-zero");
        }
        if self.backend == BackendKind::Gemini && GeminiClient::api_key_from_env().is_none() {
            bail!(
                "backend 'gemini' selected but {} is not set; \
                 export the key or switch to the ollama backend",
                GEMINI_API_KEY_ENV
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.backend, BackendKind::Ollama);
        assert_eq!(config.llm.ollama_url, OLLAMA_DEFAULT_URL);
        assert_eq!(config.llm.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            backend = "gemini"

            [llm]
            timeout_secs = 30
            "#,
        )
        .unwrap();
        assert_eq!(config.backend, BackendKind::Gemini);
        assert_eq!(config.llm.timeout_secs, 30);
        // Unset fields keep their defaults
        assert_eq!(config.llm.gemini_model, GEMINI_DEFAULT_MODEL);
        assert_eq!(config.db_path, DEFAULT_DB_PATH);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = Config::default();
        config.llm.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = Config::load_from("/nonexistent/symptomd.toml").unwrap();
        assert_eq!(config.backend, BackendKind::Ollama);
    }
}
