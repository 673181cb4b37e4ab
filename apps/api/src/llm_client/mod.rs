/// LLM Client — the single point of entry for all generation calls.
///
/// ARCHITECTURAL RULE: No other module may call the provider API directly.
/// Handlers depend on the `GenerationService` trait; `LlmClient` is its production backend.
///
/// Provider: Groq chat completions (OpenAI-compatible). Model is hardcoded to prevent drift.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

use crate::llm_client::prompts::ACADEMIC_ASSISTANT_SYSTEM;

pub const DEFAULT_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
/// The model used for all generation calls.
pub const MODEL: &str = "llama-3.3-70b-versatile";
const MAX_TOKENS: u32 = 2048;
const TEMPERATURE: f32 = 0.7;
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// Sends a task template and topic upstream and resolves with the raw generated text.
///
/// Carried in `AppState` as `Arc<dyn GenerationService>`.
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate(&self, task_template: &str, topic: &str) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatResponse {
    /// Extracts the text of the first choice, if it is non-blank.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .filter(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

/// Wraps the chat-completions API with retry logic.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    api_url: String,
}

impl LlmClient {
    pub fn new(api_key: String, api_url: String) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(60))
                .build()?,
            api_key,
            api_url,
        })
    }

    /// Makes a raw call to the provider, returning the full response object.
    /// Retries on 429 (rate limit) and 5xx errors with exponential backoff.
    pub async fn call(&self, system: &str, prompt: &str) -> Result<ChatResponse, LlmError> {
        let request_body = ChatRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&self.api_url)
                .bearer_auth(&self.api_key)
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: provider_message(body),
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message: provider_message(body),
                });
            }

            let chat_response: ChatResponse = response.json().await?;

            if let Some(usage) = &chat_response.usage {
                debug!(
                    "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                    usage.prompt_tokens, usage.completion_tokens
                );
            }

            return Ok(chat_response);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}

#[async_trait]
impl GenerationService for LlmClient {
    async fn generate(&self, task_template: &str, topic: &str) -> Result<String, LlmError> {
        let system = format!("{ACADEMIC_ASSISTANT_SYSTEM}\n\n{task_template}");
        let response = self.call(&system, topic).await?;
        response
            .text()
            .map(String::from)
            .ok_or(LlmError::EmptyContent)
    }
}

/// Pulls the human-readable message out of a provider error body, if it has one.
fn provider_message(body: String) -> String {
    serde_json::from_str::<ProviderError>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_message_extracts_error_body() {
        let body = r#"{"error": {"message": "Invalid API Key", "type": "invalid_request_error"}}"#;
        assert_eq!(provider_message(body.to_string()), "Invalid API Key");
    }

    #[test]
    fn test_provider_message_passes_through_plain_text() {
        assert_eq!(provider_message("Bad Gateway".to_string()), "Bad Gateway");
    }

    #[test]
    fn test_response_text_takes_first_choice() {
        let json = r#"{
            "choices": [
                {"message": {"role": "assistant", "content": "Thesis.\n\nClaim."}},
                {"message": {"role": "assistant", "content": "ignored"}}
            ],
            "usage": {"prompt_tokens": 120, "completion_tokens": 40, "total_tokens": 160}
        }"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.text(), Some("Thesis.\n\nClaim."));
        assert_eq!(response.usage.unwrap().completion_tokens, 40);
    }

    #[test]
    fn test_response_text_rejects_blank_content() {
        let json = r#"{"choices": [{"message": {"content": "  "}}]}"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert!(response.text().is_none());

        let json = r#"{"choices": []}"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert!(response.text().is_none());
    }

    #[test]
    fn test_api_error_message_is_human_readable() {
        let err = LlmError::Api {
            status: 401,
            message: "Invalid API Key".to_string(),
        };
        assert_eq!(err.to_string(), "API error (status 401): Invalid API Key");
    }
}
