/// Generation boundary — the single point of entry for all text-generation
/// calls in AstroVars.
///
/// ARCHITECTURAL RULE: no other module may talk to a model API directly.
/// Both backends implement `GenerationBackend` and are selected once at
/// startup from configuration; callers never know which one they got.
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod local;
pub mod remote;

/// Fixed sampling parameters for every generation call. Intentionally not
/// configurable to keep outputs comparable across backends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SamplingParams {
    pub temperature: f64,
    pub top_p: f64,
    pub max_tokens: u32,
    pub repetition_penalty: f64,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.95,
            max_tokens: 1000,
            repetition_penalty: 1.3,
        }
    }
}

/// A fully rendered prompt: system persona plus user message. Opaque to the
/// backends — they transport it, never inspect it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComposedPrompt {
    pub system: String,
    pub user: String,
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("backend returned empty content")]
    EmptyContent,

    #[error("model unavailable: {0}")]
    ModelUnavailable(String),
}

#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate(
        &self,
        prompt: &ComposedPrompt,
        params: &SamplingParams,
    ) -> Result<String, GenerationError>;

    /// Short backend label for logs and the generation logbook.
    fn name(&self) -> &'static str;
}

// ────────────────────────────────────────────────────────────────────────────
// Chat-completions wire types shared by both backends
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    pub temperature: f64,
    pub top_p: f64,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repetition_penalty: Option<f64>,
}

impl<'a> ChatRequest<'a> {
    pub fn new(model: &'a str, prompt: &'a ComposedPrompt, params: &SamplingParams) -> Self {
        Self {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            temperature: params.temperature,
            top_p: params.top_p,
            max_tokens: params.max_tokens,
            repetition_penalty: Some(params.repetition_penalty),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponse {
    pub choices: Vec<ChatChoice>,
    pub usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatChoiceMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatResponse {
    /// Trimmed text of the first choice, if any.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}

/// Error envelope used by chat-completions APIs.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorEnvelope {
    pub error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub message: String,
}
