//! Local generation backend — an OpenAI-compatible inference server on the
//! local machine (Ollama or LM Studio style).
//!
//! The model-availability probe runs lazily on the first request and its
//! success is cached for the process lifetime; a failed probe is retried on
//! the next request. No auth, no retry on the generation call itself.

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::llm::{
    ChatRequest, ChatResponse, ComposedPrompt, GenerationBackend, GenerationError, SamplingParams,
};

pub struct LocalBackend {
    client: reqwest::Client,
    base_url: String,
    model: String,
    ready: OnceCell<()>,
}

#[derive(Debug, Deserialize)]
struct ModelList {
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
}

impl LocalBackend {
    pub fn new(base_url: String, model: String) -> Self {
        Self {
            client: reqwest::Client::builder()
                // Local inference on CPU can be slow; allow long generations.
                .timeout(std::time::Duration::from_secs(600))
                .build()
                .expect("Failed to build HTTP client"),
            base_url,
            model,
            ready: OnceCell::new(),
        }
    }

    /// Checks once that the server is up and serving the configured model.
    async fn ensure_model(&self) -> Result<(), GenerationError> {
        self.ready
            .get_or_try_init(|| async {
                let url = format!("{}/models", self.base_url.trim_end_matches('/'));
                let list: ModelList = self.client.get(&url).send().await?.json().await?;

                if !list.data.iter().any(|entry| entry.id == self.model) {
                    return Err(GenerationError::ModelUnavailable(format!(
                        "{} is not served at {} (available: {})",
                        self.model,
                        self.base_url,
                        list.data
                            .iter()
                            .map(|entry| entry.id.as_str())
                            .collect::<Vec<_>>()
                            .join(", ")
                    )));
                }
                info!("Local model {} ready at {}", self.model, self.base_url);
                Ok(())
            })
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl GenerationBackend for LocalBackend {
    async fn generate(
        &self,
        prompt: &ComposedPrompt,
        params: &SamplingParams,
    ) -> Result<String, GenerationError> {
        self.ensure_model().await?;

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .json(&ChatRequest::new(&self.model, prompt, params))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let chat_response: ChatResponse = response.json().await?;
        debug!("Local generation completed");

        chat_response
            .text()
            .map(str::to_string)
            .ok_or(GenerationError::EmptyContent)
    }

    fn name(&self) -> &'static str {
        "local"
    }
}
