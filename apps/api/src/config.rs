use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;

/// Which generation backend serves interpretation requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Remote,
    Local,
}

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub backend: BackendKind,
    /// Chat-completions base URL; the default depends on the backend.
    pub llm_api_base: String,
    /// Required for the remote backend, unused by the local one.
    pub llm_api_key: Option<String>,
    pub llm_model: String,
    pub geocoder_base_url: String,
    /// Earliest accepted date of birth.
    pub min_birth_date: NaiveDate,
    /// When set, every generation call is appended to this JSONL file.
    pub generation_log_path: Option<PathBuf>,
    pub port: u16,
    pub rust_log: String,
}

const DEFAULT_REMOTE_API_BASE: &str = "https://api.together.xyz/v1";
const DEFAULT_LOCAL_API_BASE: &str = "http://localhost:11434/v1";
const DEFAULT_REMOTE_MODEL: &str = "meta-llama/Llama-3.3-70B-Instruct-Turbo";
const DEFAULT_LOCAL_MODEL: &str = "gemma3:1b";
const DEFAULT_GEOCODER_BASE_URL: &str = "https://nominatim.openstreetmap.org";
const DEFAULT_MIN_BIRTH_DATE: &str = "1950-01-01";

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let backend = match std::env::var("GENERATION_BACKEND")
            .unwrap_or_else(|_| "remote".to_string())
            .to_lowercase()
            .as_str()
        {
            "remote" => BackendKind::Remote,
            "local" => BackendKind::Local,
            other => bail!("GENERATION_BACKEND must be 'remote' or 'local', got {other:?}"),
        };

        let llm_api_key = match backend {
            BackendKind::Remote => Some(require_env("LLM_API_KEY")?),
            BackendKind::Local => std::env::var("LLM_API_KEY").ok(),
        };

        let llm_api_base = std::env::var("LLM_API_BASE").unwrap_or_else(|_| {
            match backend {
                BackendKind::Remote => DEFAULT_REMOTE_API_BASE,
                BackendKind::Local => DEFAULT_LOCAL_API_BASE,
            }
            .to_string()
        });

        let llm_model = std::env::var("LLM_MODEL").unwrap_or_else(|_| {
            match backend {
                BackendKind::Remote => DEFAULT_REMOTE_MODEL,
                BackendKind::Local => DEFAULT_LOCAL_MODEL,
            }
            .to_string()
        });

        let min_birth_date =
            std::env::var("MIN_BIRTH_DATE").unwrap_or_else(|_| DEFAULT_MIN_BIRTH_DATE.to_string());
        let min_birth_date = NaiveDate::parse_from_str(&min_birth_date, "%Y-%m-%d")
            .with_context(|| format!("MIN_BIRTH_DATE must be YYYY-MM-DD, got {min_birth_date:?}"))?;

        Ok(Config {
            backend,
            llm_api_base,
            llm_api_key,
            llm_model,
            geocoder_base_url: std::env::var("GEOCODER_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GEOCODER_BASE_URL.to_string()),
            min_birth_date,
            generation_log_path: std::env::var("GENERATION_LOG_PATH").ok().map(PathBuf::from),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
