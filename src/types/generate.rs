//! Types for text generation requests.

use serde::{Deserialize, Serialize};

/// Options for a single generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Model to use for generation.
    pub model: String,

    /// Maximum number of tokens to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<usize>,

    /// Sampling temperature (0.0 to 2.0).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// System message sent ahead of the prompt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
}

impl GenerateOptions {
    /// Create options with the specified model.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            max_tokens: None,
            temperature: None,
            system: None,
        }
    }

    /// Set max tokens.
    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set temperature.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the system message.
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let opts = GenerateOptions::new("gpt-4o-mini")
            .max_tokens(300)
            .temperature(0.7)
            .system("be kind");
        assert_eq!(opts.model, "gpt-4o-mini");
        assert_eq!(opts.max_tokens, Some(300));
        assert_eq!(opts.temperature, Some(0.7));
        assert_eq!(opts.system.as_deref(), Some("be kind"));
    }

    #[test]
    fn unset_fields_are_skipped() {
        let json = serde_json::to_value(GenerateOptions::new("m")).unwrap();
        assert_eq!(json, serde_json::json!({"model": "m"}));
    }
}
