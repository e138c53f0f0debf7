//! Ollama client for locally hosted generation models.
//!
//! Uses the non-streaming `/api/generate` endpoint.
//! See: <https://github.com/ollama/ollama/blob/main/docs/api.md>

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::traits::GenerateProvider;
use super::{DEFAULT_TIMEOUT, check_response, http_client};
use crate::types::GenerateOptions;
use crate::{Result, SolaceError};

/// Default Ollama address.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Client for a local Ollama server.
#[derive(Clone)]
pub struct OllamaClient {
    http: Client,
    base_url: String,
}

impl OllamaClient {
    /// Create a client for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            http: http_client(DEFAULT_TIMEOUT)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Client for the default local address, with the default timeout.
    pub fn local() -> Result<Self> {
        Self::new(DEFAULT_BASE_URL)
    }

    /// Set the HTTP timeout.
    pub fn timeout(mut self, timeout: Duration) -> Result<Self> {
        self.http = http_client(timeout)?;
        Ok(self)
    }

    pub async fn complete(&self, prompt: &str, options: &GenerateOptions) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);

        let response = self
            .http
            .post(&url)
            .json(&GenerateRequest {
                model: &options.model,
                prompt,
                system: options.system.as_deref(),
                stream: false,
                options: ModelOptions {
                    num_predict: options.max_tokens,
                    temperature: options.temperature,
                },
            })
            .send()
            .await?;

        let response = check_response(response, &options.model, "Ollama").await?;

        let body: GenerateReply = response.json().await?;
        body.response.ok_or(SolaceError::EmptyResponse)
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    stream: bool,
    options: ModelOptions,
}

#[derive(Serialize)]
struct ModelOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Deserialize)]
struct GenerateReply {
    #[serde(default)]
    response: Option<String>,
}

#[async_trait]
impl GenerateProvider for OllamaClient {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<String> {
        self.complete(prompt, options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_uses_default_address() {
        let client = OllamaClient::local().unwrap();
        assert_eq!(client.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = OllamaClient::new("http://gpu-box:11434/").unwrap();
        assert_eq!(client.base_url, "http://gpu-box:11434");
    }
}
