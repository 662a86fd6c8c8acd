//! Remote generation backend — an OpenAI-compatible chat-completions API.
//!
//! Retries 429 and 5xx with exponential backoff; other failures return
//! immediately with the API's own message when one can be parsed.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::llm::{
    ApiErrorEnvelope, ChatRequest, ChatResponse, ComposedPrompt, GenerationBackend,
    GenerationError, SamplingParams,
};

const MAX_RETRIES: u32 = 3;

pub struct RemoteBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl RemoteBackend {
    pub fn new(base_url: String, api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            base_url,
            api_key,
            model,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl GenerationBackend for RemoteBackend {
    async fn generate(
        &self,
        prompt: &ComposedPrompt,
        params: &SamplingParams,
    ) -> Result<String, GenerationError> {
        let request_body = ChatRequest::new(&self.model, prompt, params);
        let mut last_error: Option<GenerationError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "Generation attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(self.endpoint())
                .bearer_auth(&self.api_key)
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(GenerationError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Generation API returned {}: {}", status, body);
                last_error = Some(GenerationError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(GenerationError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let chat_response: ChatResponse = response.json().await?;

            if let Some(usage) = &chat_response.usage {
                debug!(
                    "Generation succeeded: prompt_tokens={}, completion_tokens={}",
                    usage.prompt_tokens, usage.completion_tokens
                );
            }

            return chat_response
                .text()
                .map(str::to_string)
                .ok_or(GenerationError::EmptyContent);
        }

        Err(last_error.unwrap_or(GenerationError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}
