//! Solace error types

use std::time::Duration;

/// Solace error types
#[derive(Debug, thiserror::Error)]
pub enum SolaceError {
    // Classifier errors
    /// Classifier artifacts are missing or incompatible with the label set.
    /// Raised at startup only; the service must not serve traffic.
    #[error("emotion model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("inference failed: {0}")]
    Inference(String),

    // Generation backend errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("model not found: {0}")]
    ModelNotFound(String),

    #[error("generation timed out after {0:?}")]
    Timeout(Duration),

    #[error("empty response from model")]
    EmptyResponse,

    // Data errors
    #[error("schema parse error: {0}")]
    SchemaParse(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    // Configuration errors
    #[error("missing API key: set {0}")]
    MissingApiKey(&'static str),

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for SolaceError {
    fn from(err: reqwest::Error) -> Self {
        SolaceError::Http(err.to_string())
    }
}

/// Result type alias for Solace operations
pub type Result<T> = std::result::Result<T, SolaceError>;
