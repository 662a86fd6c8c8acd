//! Append-only generation log — one JSON line per generation call.
//!
//! Disabled unless a path is configured. Append failures are logged and
//! swallowed; the logbook must never fail a user request.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationLogRecord {
    pub timestamp: DateTime<Utc>,
    pub prompt: String,
    /// Generated narrative on success, the error description on failure.
    pub response: String,
    pub status: LogStatus,
}

impl GenerationLogRecord {
    pub fn success(prompt: &str, response: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            prompt: prompt.to_string(),
            response: response.to_string(),
            status: LogStatus::Success,
        }
    }

    pub fn error(prompt: &str, error: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            prompt: prompt.to_string(),
            response: error.to_string(),
            status: LogStatus::Error,
        }
    }
}

#[derive(Clone)]
pub struct GenerationLog {
    path: Option<PathBuf>,
}

impl GenerationLog {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.path.is_some()
    }

    pub async fn append(&self, record: &GenerationLogRecord) {
        let Some(path) = &self.path else {
            return;
        };
        if let Err(e) = self.append_inner(path.clone(), record).await {
            warn!("Failed to append generation log record: {e}");
        }
    }

    async fn append_inner(
        &self,
        path: PathBuf,
        record: &GenerationLogRecord,
    ) -> anyhow::Result<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        Ok(())
    }
}
