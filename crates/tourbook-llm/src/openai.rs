//! OpenAI-compatible Provider Implementation
//!
//! Talks to any server exposing the `/chat/completions` endpoint (OpenAI,
//! Azure-style gateways, local proxies).
//!
//! # Features
//!
//! - Explicit credentials passed at construction, never read from the environment
//! - JSON mode for structured output
//! - Retry logic with exponential backoff
//! - Timeout handling
//!
//! # Examples
//!
//! ```no_run
//! use tourbook_llm::{LlmCredentials, OpenAiProvider};
//!
//! let credentials = LlmCredentials {
//!     api_key: Some("sk-...".to_string()),
//!     ..Default::default()
//! };
//! let provider = OpenAiProvider::new(credentials);
//! ```

use crate::LlmError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tourbook_domain::traits::LlmProvider as LlmProviderTrait;
use tracing::{debug, warn};

/// Default API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";

/// Default model
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default timeout for a single HTTP request (60 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default number of attempts per call
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Backend credentials and target
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmCredentials {
    /// API key; `None` means the backend is unconfigured
    pub api_key: Option<String>,
    /// Base URL, without the `/chat/completions` suffix
    pub endpoint: String,
    /// Model name
    pub model: String,
}

impl Default for LlmCredentials {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl fmt::Debug for LlmCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmCredentials")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .finish()
    }
}

/// Provider for OpenAI-compatible chat-completions APIs
pub struct OpenAiProvider {
    credentials: LlmCredentials,
    client: reqwest::Client,
    max_retries: u32,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

impl OpenAiProvider {
    /// Create a new provider
    pub fn new(credentials: LlmCredentials) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            credentials,
            client,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Set the maximum number of attempts per call
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// Model this provider targets
    pub fn model(&self) -> &str {
        &self.credentials.model
    }

    async fn complete(&self, prompt: &str, json_mode: bool) -> Result<String, LlmError> {
        let api_key = self
            .credentials
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(LlmError::MissingCredentials)?;

        let url = format!(
            "{}/chat/completions",
            self.credentials.endpoint.trim_end_matches('/')
        );
        let system = if json_mode {
            "You extract structured data and answer with a single JSON object."
        } else {
            "You are a helpful assistant."
        };
        let request_body = ChatRequest {
            model: &self.credentials.model,
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
            temperature: 0.0,
            response_format: json_mode.then_some(ResponseFormat {
                kind: "json_object",
            }),
        };

        // Retry logic with exponential backoff
        let mut attempts = 0;
        let mut last_error = None;

        while attempts < self.max_retries {
            debug!(model = %self.credentials.model, attempt = attempts + 1, "Sending completion request");
            match self
                .client
                .post(&url)
                .bearer_auth(api_key)
                .json(&request_body)
                .send()
                .await
            {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let body = response.json::<ChatResponse>().await.map_err(|e| {
                            LlmError::InvalidResponse(format!("Failed to parse response: {}", e))
                        })?;
                        return body
                            .choices
                            .into_iter()
                            .next()
                            .and_then(|c| c.message.content)
                            .ok_or_else(|| {
                                LlmError::InvalidResponse("Response has no content".to_string())
                            });
                    } else if status == reqwest::StatusCode::UNAUTHORIZED
                        || status == reqwest::StatusCode::FORBIDDEN
                    {
                        return Err(LlmError::Communication(format!(
                            "HTTP {}: credentials rejected",
                            status
                        )));
                    } else if status == reqwest::StatusCode::NOT_FOUND {
                        return Err(LlmError::ModelNotAvailable(self.credentials.model.clone()));
                    } else if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        last_error = Some(LlmError::RateLimitExceeded);
                    } else {
                        let error_text = response
                            .text()
                            .await
                            .unwrap_or_else(|_| "Unknown error".to_string());
                        last_error = Some(LlmError::Communication(format!(
                            "HTTP {}: {}",
                            status, error_text
                        )));
                    }
                }
                Err(e) => {
                    last_error = Some(LlmError::Communication(format!("Request failed: {}", e)));
                }
            }

            attempts += 1;
            if attempts < self.max_retries {
                // Exponential backoff: 1s, 2s, 4s, etc.
                let delay = Duration::from_secs(2u64.pow(attempts - 1));
                warn!(attempt = attempts, ?delay, "Completion request failed, retrying");
                tokio::time::sleep(delay).await;
            }
        }

        Err(last_error
            .unwrap_or_else(|| LlmError::Communication("Max retries exceeded".to_string())))
    }
}

#[async_trait]
impl LlmProviderTrait for OpenAiProvider {
    type Error = LlmError;

    async fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        self.complete(prompt, false).await
    }

    async fn generate_structured(
        &self,
        prompt: &str,
        _schema: &str,
    ) -> Result<String, Self::Error> {
        self.complete(prompt, true).await
    }

    fn has_credentials(&self) -> bool {
        self.credentials
            .api_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials(key: Option<&str>) -> LlmCredentials {
        LlmCredentials {
            api_key: key.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_provider_creation() {
        let provider = OpenAiProvider::new(credentials(Some("sk-test")));
        assert_eq!(provider.model(), DEFAULT_MODEL);
        assert_eq!(provider.max_retries, DEFAULT_MAX_RETRIES);
        assert!(provider.has_credentials());
    }

    #[test]
    fn test_with_max_retries_never_zero() {
        let provider = OpenAiProvider::new(credentials(None)).with_max_retries(0);
        assert_eq!(provider.max_retries, 1);
    }

    #[test]
    fn test_blank_key_is_not_a_credential() {
        assert!(!OpenAiProvider::new(credentials(None)).has_credentials());
        assert!(!OpenAiProvider::new(credentials(Some("  "))).has_credentials());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let rendered = format!("{:?}", credentials(Some("sk-secret")));
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[tokio::test]
    async fn test_missing_credentials_short_circuits() {
        let provider = OpenAiProvider::new(credentials(None));
        let result = provider.generate_structured("prompt", "{}").await;
        assert!(matches!(result, Err(LlmError::MissingCredentials)));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_communication_error() {
        let provider = OpenAiProvider::new(LlmCredentials {
            api_key: Some("sk-test".to_string()),
            endpoint: "http://127.0.0.1:9".to_string(),
            model: DEFAULT_MODEL.to_string(),
        })
        .with_max_retries(1);

        let result = provider.generate("test").await;
        assert!(matches!(result, Err(LlmError::Communication(_))));
    }
}
