//! Operator CLI for the symptom checker service.
//!
//! `doctor` runs the preflight checks an operator wants before starting
//! the daemon: config loads, credentials are present for the hosted
//! variant, the database location is usable, and the backend is
//! reachable. `health` and `history` talk to a running daemon.

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use std::time::Duration;
use symptom_common::config::{BackendKind, Config};
use symptom_common::gemini::GeminiClient;
use symptom_common::ollama::OllamaClient;
use symptom_common::protocol::{HealthResponse, HistoryResponse};
use symptom_common::QueryStore;

/// Default daemon URL for health/history commands
const DEFAULT_DAEMON_URL: &str = "http://127.0.0.1:8000";

/// Timeout for CLI requests to the daemon
const REQUEST_TIMEOUT_SECS: u64 = 5;

#[derive(Parser)]
#[command(name = "symptomctl", version, about = "Symptom checker service control")]
struct Cli {
    /// Base URL of a running symptomd
    #[arg(long, default_value = DEFAULT_DAEMON_URL, global = true)]
    url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run preflight checks (config, credentials, store, backend)
    Doctor,
    /// Query a running daemon's health endpoint
    Health,
    /// Show recent analysis history from a running daemon
    History {
        /// Maximum number of records
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Doctor => doctor().await,
        Command::Health => health(&cli.url).await,
        Command::History { limit } => history(&cli.url, limit).await,
    }
}

fn check(ok: bool, label: &str, detail: &str) -> bool {
    if ok {
        println!("  {} {}", "✓".green(), label);
    } else {
        println!("  {} {} - {}", "✗".red(), label, detail);
    }
    ok
}

async fn doctor() -> Result<()> {
    println!("{}", "Checking symptomd preflight...".bold());
    let mut all_ok = true;

    // Config
    let config = match Config::load() {
        Ok(config) => {
            check(true, "config", "");
            config
        }
        Err(e) => {
            check(false, "config", &e.to_string());
            bail!("cannot continue without a loadable config");
        }
    };
    println!("    backend: {:?}", config.backend);

    // Credentials
    match config.backend {
        BackendKind::Gemini => {
            all_ok &= check(
                GeminiClient::api_key_from_env().is_some(),
                "GEMINI_API_KEY",
                "not set; export GEMINI_API_KEY=... before starting symptomd",
            );
        }
        BackendKind::Ollama => {
            check(true, "no credentials needed (local backend)", "");
        }
    }

    // Store: opening creates the schema, same as daemon startup
    let store_ok = QueryStore::open_at(&config.db_path).is_ok();
    all_ok &= check(
        store_ok,
        &format!("database at {}", config.db_path),
        "path is not writable",
    );

    // Backend reachability (local variant only; the hosted API is not
    // probed to avoid burning quota on a preflight)
    if config.backend == BackendKind::Ollama {
        let client = OllamaClient::new(
            &config.llm.ollama_url,
            &config.llm.ollama_model,
            Duration::from_secs(config.llm.timeout_secs),
            config.llm.max_output_tokens,
        );
        let reachable = client.is_available().await;
        all_ok &= check(
            reachable,
            &format!("ollama at {}", config.llm.ollama_url),
            "not reachable; is the Ollama server running?",
        );

        if reachable {
            match client.list_models().await {
                Ok(models) => {
                    let present = models.iter().any(|m| {
                        m == client.model()
                            || m.split(':').next() == client.model().split(':').next()
                    });
                    all_ok &= check(
                        present,
                        &format!("model {}", client.model()),
                        "not downloaded; run `ollama pull <model>`",
                    );
                }
                Err(e) => {
                    all_ok &= check(false, "model list", &e.to_string());
                }
            }
        }
    }

    if all_ok {
        println!("\n{}", "All checks passed.".green().bold());
        Ok(())
    } else {
        bail!("one or more preflight checks failed");
    }
}

async fn health(url: &str) -> Result<()> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()?;

    let health: HealthResponse = client
        .get(format!("{}/health", url.trim_end_matches('/')))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    println!("status:    {}", health.status.green());
    println!("timestamp: {}", health.timestamp);
    if let Some(key_set) = health.api_key_set {
        println!("api key:   {}", if key_set { "set" } else { "missing" });
    }
    Ok(())
}

async fn history(url: &str, limit: usize) -> Result<()> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()?;

    let history: HistoryResponse = client
        .get(format!("{}/history", url.trim_end_matches('/')))
        .query(&[("limit", limit)])
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    if history.queries.is_empty() {
        println!("No queries recorded yet.");
        return Ok(());
    }

    println!("{} record(s), newest first:\n", history.count);
    for record in &history.queries {
        println!(
            "{} [{}] {}",
            format!("#{}", record.id).bold(),
            record.created_at.format("%Y-%m-%d %H:%M:%S"),
            record.symptoms
        );
        for condition in &record.conditions {
            println!("    - {}", condition);
        }
        println!();
    }
    Ok(())
}
