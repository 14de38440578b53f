//! Tourbook LLM Provider Layer
//!
//! Implementations of the `LlmProvider` trait from `tourbook-domain`.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic scripted backend for testing
//! - `OpenAiProvider`: OpenAI-compatible chat-completions API
//!
//! # Examples
//!
//! ```
//! use tourbook_llm::MockProvider;
//! use tourbook_domain::traits::LlmProvider;
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let provider = MockProvider::new("Hello from LLM!");
//! let result = provider.generate("test prompt").await.unwrap();
//! assert_eq!(result, "Hello from LLM!");
//! # });
//! ```

#![warn(missing_docs)]

pub mod openai;

use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use thiserror::Error;
use tourbook_domain::traits::LlmProvider as LlmProviderTrait;

pub use openai::{LlmCredentials, OpenAiProvider};

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// No API key configured
    #[error("Missing credentials")]
    MissingCredentials,

    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),
}

const ERROR_SENTINEL: &str = "ERROR";

/// Mock LLM provider for deterministic testing
///
/// Responses are scripted by prompt marker: the first registered marker that
/// occurs anywhere in the prompt wins, otherwise the default response is
/// returned. No network calls are made.
///
/// # Examples
///
/// ```
/// use tourbook_llm::MockProvider;
/// use tourbook_domain::traits::LlmProvider;
///
/// # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
/// let mut provider = MockProvider::default();
/// provider.add_response("FIELD GROUP: venue", r#"{"name": "The Fillmore"}"#);
/// let out = provider.generate("...FIELD GROUP: venue...").await.unwrap();
/// assert!(out.contains("Fillmore"));
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    responses: Arc<Mutex<Vec<(String, String)>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    delay: Option<Duration>,
    has_credentials: bool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            responses: Arc::new(Mutex::new(Vec::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
            delay: None,
            has_credentials: true,
        }
    }

    /// Respond with `response` to any prompt containing `marker`
    pub fn add_response(&mut self, marker: impl Into<String>, response: impl Into<String>) {
        lock(&self.responses).push((marker.into(), response.into()));
    }

    /// Fail with a communication error for any prompt containing `marker`
    pub fn add_error(&mut self, marker: impl Into<String>) {
        lock(&self.responses).push((marker.into(), ERROR_SENTINEL.to_string()));
    }

    /// Sleep this long before answering (for timeout tests)
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Behave like a provider with no API key configured
    pub fn without_credentials(mut self) -> Self {
        self.has_credentials = false;
        self
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        lock(&self.prompts).len()
    }

    /// Prompts received so far, oldest first
    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        lock(&self.prompts).clear();
    }

    fn respond(&self, prompt: &str) -> Result<String, LlmError> {
        let responses = lock(&self.responses);
        match responses.iter().find(|(marker, _)| prompt.contains(marker.as_str())) {
            Some((_, response)) if response == ERROR_SENTINEL => {
                Err(LlmError::Communication("Mock error".to_string()))
            }
            Some((_, response)) => Ok(response.clone()),
            None => Ok(self.default_response.clone()),
        }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

#[async_trait]
impl LlmProviderTrait for MockProvider {
    type Error = LlmError;

    async fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        lock(&self.prompts).push(prompt.to_string());

        if !self.has_credentials {
            return Err(LlmError::MissingCredentials);
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.respond(prompt)
    }

    async fn generate_structured(
        &self,
        prompt: &str,
        _schema: &str,
    ) -> Result<String, Self::Error> {
        self.generate(prompt).await
    }

    fn has_credentials(&self) -> bool {
        self.has_credentials
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_provider_default() {
        let provider = MockProvider::new("Test response");
        let result = provider.generate("any prompt").await;
        assert_eq!(result.unwrap(), "Test response");
    }

    #[tokio::test]
    async fn test_mock_provider_marker_responses() {
        let mut provider = MockProvider::default();
        provider.add_response("hello", "world");
        provider.add_response("foo", "bar");

        assert_eq!(provider.generate("say hello!").await.unwrap(), "world");
        assert_eq!(provider.generate("foo fighters").await.unwrap(), "bar");
        assert_eq!(
            provider.generate("unknown").await.unwrap(),
            "Default mock response"
        );
    }

    #[tokio::test]
    async fn test_first_registered_marker_wins() {
        let mut provider = MockProvider::default();
        provider.add_response("venue", "first");
        provider.add_response("venue group", "second");
        assert_eq!(provider.generate("the venue group").await.unwrap(), "first");
    }

    #[tokio::test]
    async fn test_mock_provider_call_count() {
        let provider = MockProvider::new("test");
        assert_eq!(provider.call_count(), 0);

        provider.generate("prompt1").await.unwrap();
        provider.generate("prompt2").await.unwrap();
        assert_eq!(provider.call_count(), 2);
        assert_eq!(provider.prompts(), vec!["prompt1", "prompt2"]);

        provider.reset_call_count();
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_mock_provider_error() {
        let mut provider = MockProvider::default();
        provider.add_error("bad prompt");

        let result = provider.generate("a bad prompt").await;
        assert!(matches!(result, Err(LlmError::Communication(_))));
    }

    #[tokio::test]
    async fn test_mock_provider_without_credentials() {
        let provider = MockProvider::new("unused").without_credentials();
        assert!(!provider.has_credentials());
        let result = provider.generate_structured("prompt", "{}").await;
        assert!(matches!(result, Err(LlmError::MissingCredentials)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_mock_provider_delay() {
        let provider = MockProvider::new("slow").with_delay(Duration::from_secs(5));
        let started = tokio::time::Instant::now();
        assert_eq!(provider.generate("x").await.unwrap(), "slow");
        assert!(started.elapsed() >= Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_mock_provider_clone_shares_state() {
        let provider1 = MockProvider::new("test");
        let provider2 = provider1.clone();

        provider1.generate("test").await.unwrap();

        assert_eq!(provider1.call_count(), 1);
        assert_eq!(provider2.call_count(), 1);
    }
}
