//! Generation backends.
//!
//! Each backend implements [`GenerateProvider`]. HTTP status handling is
//! shared so every backend reports failures with the same error variants.

#[cfg(feature = "ollama")]
pub mod ollama;
#[cfg(feature = "openai")]
pub mod openai;
pub mod traits;

#[cfg(feature = "ollama")]
pub use ollama::OllamaClient;
#[cfg(feature = "openai")]
pub use openai::OpenAiClient;
pub use traits::GenerateProvider;

use std::time::Duration;

#[cfg(any(feature = "openai", feature = "ollama"))]
use reqwest::Client;

#[cfg(any(feature = "openai", feature = "ollama"))]
use crate::{Result, SolaceError};

/// Default per-request timeout for backend HTTP calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Build the HTTP client used by a backend.
#[cfg(any(feature = "openai", feature = "ollama"))]
pub(crate) fn http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| SolaceError::Configuration(format!("Failed to build HTTP client: {e}")))
}

/// Check response status and map to the appropriate error.
///
/// Passes successful responses through untouched.
#[cfg(any(feature = "openai", feature = "ollama"))]
pub(crate) async fn check_response(
    response: reqwest::Response,
    model: &str,
    provider: &str,
) -> Result<reqwest::Response> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    match status.as_u16() {
        401 | 403 => Err(SolaceError::AuthenticationFailed),
        404 => Err(SolaceError::ModelNotFound(model.to_string())),
        429 => {
            // Try to parse retry-after header
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_secs);
            Err(SolaceError::RateLimited { retry_after })
        }
        code => {
            let body = response.text().await.unwrap_or_default();
            let message = if body.is_empty() {
                format!("{provider} API error: {status}")
            } else {
                format!("{provider} API error: {status}: {body}")
            };
            Err(SolaceError::Api {
                status: code,
                message,
            })
        }
    }
}
