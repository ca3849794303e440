/// LLM Client — the single point of entry for all chat-completion calls.
///
/// ARCHITECTURAL RULE: No other module may call the completion API directly.
/// Everything goes through the `ChatDelegate` capability defined here, so the
/// model is always treated as an untrusted oracle whose output must be parsed.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;

pub mod json_extract;
pub mod prompts;

pub use json_extract::extract_json;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

impl LlmError {
    /// True when the provider rejected our credentials rather than the request.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, LlmError::Api { status, .. } if *status == 401 || *status == 403)
    }

    /// True when the call succeeded but the reply could not be used.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            LlmError::Parse(_) | LlmError::MalformedResponse(_) | LlmError::EmptyContent
        )
    }
}

/// Sampling parameters for a single completion call.
#[derive(Debug, Clone, Copy)]
pub struct CallOptions {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CallOptions {
    pub const fn new(temperature: f32, max_tokens: u32) -> Self {
        Self {
            temperature,
            max_tokens,
        }
    }
}

/// Text prompt in, text completion out. May fail or time out.
///
/// Carried in `AppState` as `Arc<dyn ChatDelegate>`.
#[async_trait]
pub trait ChatDelegate: Send + Sync {
    async fn complete(
        &self,
        prompt: &str,
        system: &str,
        options: CallOptions,
    ) -> Result<String, LlmError>;
}

/// Calls the delegate and deserializes the JSON payload embedded in its reply.
/// The prompt must instruct the model to return JSON.
pub async fn call_json<T: DeserializeOwned>(
    delegate: &dyn ChatDelegate,
    prompt: &str,
    system: &str,
    options: CallOptions,
) -> Result<T, LlmError> {
    let text = delegate.complete(prompt, system, options).await?;
    let value = extract_json(&text)?;
    serde_json::from_value(value).map_err(LlmError::Parse)
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
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
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
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
    /// Text of the first choice, if the model produced any.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty())
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

/// Client for an OpenAI-compatible chat-completions endpoint.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
    max_retries: u32,
}

impl LlmClient {
    pub fn new(config: &Config) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.llm_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key: config.llm_api_key.clone(),
            endpoint: format!(
                "{}/chat/completions",
                config.llm_base_url.trim_end_matches('/')
            ),
            model: config.llm_model.clone(),
            max_retries: config.llm_max_retries,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Makes a raw call to the completion API, returning the full response object.
    /// With `max_retries > 0`, retries 429/5xx/transport failures with exponential backoff.
    pub async fn call(
        &self,
        prompt: &str,
        system: &str,
        options: CallOptions,
    ) -> Result<ChatResponse, LlmError> {
        let request_body = ChatRequest {
            model: &self.model,
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
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };

        let attempts = self.max_retries + 1;
        let mut last_error: Option<LlmError> = None;

        for attempt in 0..attempts {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s, ...
                let delay = Duration::from_millis(1000 * (1 << (attempt - 1).min(5)));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&self.endpoint)
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
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
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
            retries: self.max_retries,
        }))
    }
}

#[async_trait]
impl ChatDelegate for LlmClient {
    async fn complete(
        &self,
        prompt: &str,
        system: &str,
        options: CallOptions,
    ) -> Result<String, LlmError> {
        let response = self.call(prompt, system, options).await?;
        response
            .text()
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedDelegate;
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Payload {
        key: String,
    }

    #[test]
    fn test_chat_response_text_skips_blank() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"content":"   "}}],"usage":null}"#,
        )
        .unwrap();
        assert!(response.text().is_none());
    }

    #[test]
    fn test_chat_response_text_first_choice() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"content":" hello "}}],
                "usage":{"prompt_tokens":3,"completion_tokens":1}}"#,
        )
        .unwrap();
        assert_eq!(response.text(), Some("hello"));
    }

    #[test]
    fn test_auth_failure_detection() {
        let err = LlmError::Api {
            status: 401,
            message: "invalid key".into(),
        };
        assert!(err.is_auth_failure());
        assert!(!LlmError::EmptyContent.is_auth_failure());
    }

    #[test]
    fn test_malformed_detection() {
        assert!(LlmError::EmptyContent.is_malformed());
        assert!(LlmError::MalformedResponse("no json".into()).is_malformed());
        assert!(!LlmError::RateLimited { retries: 2 }.is_malformed());
        assert!(!LlmError::Api {
            status: 401,
            message: "Invalid API Key".into()
        }
        .is_malformed());
    }

    #[test]
    fn test_client_endpoint_trims_trailing_slash() {
        let mut config = Config::for_tests();
        config.llm_base_url = "http://localhost:9999/v1/".to_string();
        let client = LlmClient::new(&config).unwrap();
        assert_eq!(client.endpoint, "http://localhost:9999/v1/chat/completions");
    }

    #[tokio::test]
    async fn test_call_json_tolerates_fenced_reply() {
        let delegate = ScriptedDelegate::new().reply("Sure!\n```json\n{\"key\": \"value\",}\n```");
        let payload: Payload = call_json(&delegate, "p", "s", CallOptions::new(0.2, 10))
            .await
            .unwrap();
        assert_eq!(payload.key, "value");
    }

    #[tokio::test]
    async fn test_call_json_reports_malformed_reply() {
        let delegate = ScriptedDelegate::new().reply("I cannot help with that.");
        let err = call_json::<Payload>(&delegate, "p", "s", CallOptions::new(0.2, 10))
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::MalformedResponse(_)));
    }
}
