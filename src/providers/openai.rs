//! OpenAI chat-completions client.
//!
//! Sends the prompt as a single user message (plus the optional system
//! message) and returns the first choice's content.
//! See: <https://platform.openai.com/docs/api-reference/chat/create>

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::traits::GenerateProvider;
use super::{DEFAULT_TIMEOUT, check_response, http_client};
use crate::types::GenerateOptions;
use crate::{Result, SolaceError};

/// Default base URL for the OpenAI API
const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Client for the OpenAI chat-completions endpoint.
#[derive(Clone)]
pub struct OpenAiClient {
    api_key: String,
    http: Client,
    base_url: String,
}

impl OpenAiClient {
    /// Create a new client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create a client with a custom base URL (for testing with wiremock).
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            api_key: api_key.into(),
            http: http_client(DEFAULT_TIMEOUT)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Set the HTTP timeout.
    pub fn timeout(mut self, timeout: Duration) -> Result<Self> {
        self.http = http_client(timeout)?;
        Ok(self)
    }

    /// Run one chat completion and return the assistant text.
    pub async fn complete(&self, prompt: &str, options: &GenerateOptions) -> Result<String> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let mut messages = Vec::with_capacity(2);
        if let Some(ref system) = options.system {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: prompt,
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&ChatRequest {
                model: &options.model,
                messages,
                max_tokens: options.max_tokens,
                temperature: options.temperature,
            })
            .send()
            .await?;

        let response = check_response(response, &options.model, "OpenAI").await?;

        let body: ChatCompletion = response.json().await?;

        // blank content is still a reply; the schema parse decides what it is worth
        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(SolaceError::EmptyResponse)
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl GenerateProvider for OpenAiClient {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<String> {
        self.complete(prompt, options).await
    }
}
