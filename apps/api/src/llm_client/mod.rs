//! LLM Client: the single point of entry for every generation backend call.
//!
//! ARCHITECTURAL RULE: No other module may call the chat completions API directly.
//! All LLM interactions MUST go through this module.
//!
//! Model, temperature and output length are fixed constants.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

pub const DEFAULT_GENERATION_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
/// The model used for every ATS analysis. Intentionally not configurable.
pub const MODEL: &str = "llama-3.3-70b-versatile";
pub const TEMPERATURE: f32 = 0.2;
pub const MAX_TOKENS: u32 = 1024;
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Returned (and persisted) when the backend answers without usable text.
pub const EMPTY_ANALYSIS_FALLBACK: &str = "<p>Analysis failed to generate.</p>";

// ────────────────────────────────────────────────────────────────────────────
// Error taxonomy
// ────────────────────────────────────────────────────────────────────────────

/// Failure of one analysis attempt. The variant decides which recovery path
/// the caller offers.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("API key rejected: {0}")]
    Auth(String),

    #[error("Generation service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Invalid analysis input: {0}")]
    Input(String),
}

/// Discriminant of [`AnalysisError`] that survives a trip over the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisErrorKind {
    Auth,
    ServiceUnavailable,
    Input,
}

impl AnalysisErrorKind {
    /// Stable error code used in HTTP error bodies.
    pub fn code(self) -> &'static str {
        match self {
            AnalysisErrorKind::Auth => "INVALID_API_KEY",
            AnalysisErrorKind::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            AnalysisErrorKind::Input => "VALIDATION_ERROR",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "INVALID_API_KEY" => Some(AnalysisErrorKind::Auth),
            "SERVICE_UNAVAILABLE" => Some(AnalysisErrorKind::ServiceUnavailable),
            "VALIDATION_ERROR" => Some(AnalysisErrorKind::Input),
            _ => None,
        }
    }
}

impl AnalysisError {
    pub fn kind(&self) -> AnalysisErrorKind {
        match self {
            AnalysisError::Auth(_) => AnalysisErrorKind::Auth,
            AnalysisError::ServiceUnavailable(_) => AnalysisErrorKind::ServiceUnavailable,
            AnalysisError::Input(_) => AnalysisErrorKind::Input,
        }
    }
}

/// Maps a non-success backend response onto the analysis error taxonomy.
pub fn classify_failure(status: u16, body: &str) -> AnalysisError {
    let message = serde_json::from_str::<ApiErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string());

    match status {
        401 | 403 => AnalysisError::Auth(message),
        400 if mentions_api_key(body) => AnalysisError::Auth(message),
        _ => AnalysisError::ServiceUnavailable(format!("status {status}: {message}")),
    }
}

fn mentions_api_key(body: &str) -> bool {
    let lower = body.to_lowercase();
    ["api key", "api_key", "apikey"]
        .iter()
        .any(|needle| lower.contains(needle))
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatResponse {
    /// Text of the first choice, if it carries any non-blank content.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.as_ref())
            .and_then(|m| m.content.as_deref())
            .filter(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Backend seam
// ────────────────────────────────────────────────────────────────────────────

/// A text-generation backend. Implemented by [`LlmClient`]; swapped for
/// scripted fakes in tests.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Sends `system` then `user` as ordered conversation turns and returns the
    /// generated text, or [`EMPTY_ANALYSIS_FALLBACK`] when nothing usable came back.
    async fn complete(
        &self,
        system: &str,
        user: &str,
        credential: Option<&str>,
    ) -> Result<String, AnalysisError>;
}

/// OpenAI-compatible chat completions client.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    endpoint: String,
    default_api_key: Option<String>,
}

impl LlmClient {
    pub fn new(endpoint: String, default_api_key: Option<String>) -> anyhow::Result<Self> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()?,
            endpoint,
            default_api_key,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn call(
        &self,
        system: &str,
        user: &str,
        api_key: &str,
    ) -> Result<ChatResponse, AnalysisError> {
        let request_body = ChatRequest {
            model: MODEL,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                warn!("Generation backend unreachable: {e}");
                AnalysisError::ServiceUnavailable(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Generation backend returned {}: {}", status, body);
            return Err(classify_failure(status.as_u16(), &body));
        }

        let chat: ChatResponse = response.json().await.map_err(|e| {
            warn!("Generation backend sent an undecodable body: {e}");
            AnalysisError::ServiceUnavailable(format!("malformed response: {e}"))
        })?;

        if let Some(usage) = &chat.usage {
            debug!(
                "Generation call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        Ok(chat)
    }
}

#[async_trait]
impl GenerationBackend for LlmClient {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        credential: Option<&str>,
    ) -> Result<String, AnalysisError> {
        if system.trim().is_empty() || user.trim().is_empty() {
            return Err(AnalysisError::Input(
                "system instruction and user message must not be empty".to_string(),
            ));
        }

        let api_key = credential
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .or(self.default_api_key.as_deref())
            .ok_or_else(|| AnalysisError::Auth("no API key supplied".to_string()))?;

        let response = self.call(system, user, api_key).await?;
        Ok(analysis_text(&response))
    }
}

/// Unfenced text of the first choice, or [`EMPTY_ANALYSIS_FALLBACK`] when
/// nothing is left once fences are removed.
fn analysis_text(response: &ChatResponse) -> String {
    match response
        .text()
        .map(strip_code_fences)
        .filter(|text| !text.is_empty())
    {
        Some(text) => text.to_string(),
        None => {
            warn!("Generation backend returned no usable content");
            EMPTY_ANALYSIS_FALLBACK.to_string()
        }
    }
}

/// Strips ```html ... ``` or ``` ... ``` fences the model sometimes wraps output in.
fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop an optional language tag on the opening fence line.
    let rest = match rest.find('\n') {
        Some(idx) if !rest[..idx].contains('<') => &rest[idx + 1..],
        _ => rest,
    };
    rest.trim_end()
        .strip_suffix("```")
        .map(|s| s.trim())
        .unwrap_or(rest.trim())
}
