//! Chat completion client seam.
//!
//! All prompt-driven stages (extraction, merge) talk to the completion API
//! through the [`Completer`] trait so they can be exercised against mocks.

use crate::error::{ReferatError, Result};
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Default timeout for OpenAI API requests (5 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Create an OpenAI client with configured timeout.
///
/// Uses a 5-minute timeout by default to prevent hung API calls.
pub fn create_client() -> Client<OpenAIConfig> {
    create_client_with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
}

/// Create an OpenAI client with a custom timeout.
pub fn create_client_with_timeout(timeout: Duration) -> Client<OpenAIConfig> {
    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .expect("Failed to create HTTP client");

    Client::with_config(OpenAIConfig::default()).with_http_client(http_client)
}

/// A single completion exchange: a system instruction and optional user text.
///
/// Sampling is always deterministic-leaning (temperature 0) so repeated runs
/// over the same transcript stay comparable.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// System instruction for the exchange.
    pub system: String,
    /// User message content; empty user content still triggers a response.
    pub user: Option<String>,
    /// Cap on response length, if any.
    pub max_tokens: Option<u32>,
}

/// Trait for chat completion services.
#[async_trait]
pub trait Completer: Send + Sync {
    /// Send a completion request and return the response text.
    async fn complete(&self, request: CompletionRequest) -> Result<String>;
}

/// OpenAI-backed completer.
pub struct OpenAICompleter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAICompleter {
    /// Create a completer for the given chat model.
    pub fn new(model: &str) -> Self {
        Self {
            client: create_client(),
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl Completer for OpenAICompleter {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let mut messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(request.system)
                .build()
                .map_err(|e| ReferatError::OpenAI(e.to_string()))?
                .into(),
        ];

        if let Some(user) = request.user {
            messages.push(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(user)
                    .build()
                    .map_err(|e| ReferatError::OpenAI(e.to_string()))?
                    .into(),
            );
        }

        let mut request_builder = CreateChatCompletionRequestArgs::default();
        request_builder
            .model(&self.model)
            .messages(messages)
            .temperature(0.0);

        if let Some(max_tokens) = request.max_tokens {
            request_builder.max_tokens(max_tokens);
        }

        let chat_request = request_builder
            .build()
            .map_err(|e| ReferatError::OpenAI(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .chat()
            .create(chat_request)
            .await
            .map_err(|e| ReferatError::OpenAI(format!("Chat completion error: {}", e)))?;

        let text = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| ReferatError::OpenAI("Empty response from model".to_string()))?
            .clone();

        debug!("Received completion with {} characters", text.len());
        Ok(text)
    }
}

/// Check if the OpenAI API key is configured.
pub fn is_api_key_configured() -> bool {
    std::env::var("OPENAI_API_KEY").is_ok()
}
