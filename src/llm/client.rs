use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use super::{InferenceError, StreamAccumulator};
use crate::models::ChatMessage;

/// Environment variable holding the Hugging Face access token
pub const TOKEN_ENV_VAR: &str = "HF_TOKEN";
pub const DEFAULT_MODEL: &str = "mistralai/Mistral-Nemo-Instruct-2407";
pub const DEFAULT_BASE_URL: &str = "https://router.huggingface.co/v1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Anything that can turn a role-tagged conversation into a reply
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Run one completion and return the full reply text
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, InferenceError>;
}

/// Configuration for the Hugging Face chat-completion client
#[derive(Clone)]
pub struct HuggingFaceConfig {
    /// Access token (from HF_TOKEN env var)
    pub api_key: String,
    /// Model repository id
    pub model: String,
    /// OpenAI-compatible API root, without the `/chat/completions` suffix
    pub base_url: String,
    pub temperature: f64,
    /// Maximum tokens in response
    pub max_tokens: u32,
    /// Nucleus sampling threshold
    pub top_p: f64,
    /// Applies to the whole call, including draining the stream
    pub timeout: Duration,
}

impl HuggingFaceConfig {
    /// Create config from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = lookup(TOKEN_ENV_VAR)
            .filter(|value| !value.trim().is_empty())
            .with_context(|| {
                format!(
                    "{} is not set in the environment. Please check your .env file.",
                    TOKEN_ENV_VAR
                )
            })?;

        Ok(Self::new(api_key))
    }

    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: 0.5,
            max_tokens: 2048,
            top_p: 0.7,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

impl fmt::Debug for HuggingFaceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HuggingFaceConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("top_p", &self.top_p)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Streaming chat-completion client for the Hugging Face inference router
pub struct HuggingFaceClient {
    client: Client,
    config: HuggingFaceConfig,
}

impl HuggingFaceClient {
    pub fn new(config: HuggingFaceConfig) -> Result<Self, InferenceError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &HuggingFaceConfig {
        &self.config
    }
}

#[async_trait]
impl ChatCompletion for HuggingFaceClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, InferenceError> {
        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            top_p: self.config.top_p,
            stream: true,
        };

        let response = self
            .client
            .post(self.config.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(InferenceError::Service { status, body });
        }

        let mut accumulator = StreamAccumulator::new();
        let mut stream = response.bytes_stream();

        while let Some(bytes) = stream.next().await {
            accumulator.feed(&bytes?)?;
            if accumulator.is_done() {
                break;
            }
        }

        debug!("Stream drained: {} content chunks", accumulator.chunk_count());
        accumulator.finish()
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f64,
    max_tokens: u32,
    top_p: f64,
    stream: bool,
}
