//! Configuration loading.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. `--config <path>` (CLI flag)
//! 2. `~/.solace/config.toml` (user)
//! 3. `/etc/solace/config.toml` (system)
//! 4. built-in defaults
//!
//! Environment overrides are applied afterwards:
//! - `SOLACE_MODEL_DIR` replaces `classifier.model_dir`
//! - `OPENAI_MODEL` replaces `generator.model` for the OpenAI backend
//! - `OPENAI_API_KEY` is required when the backend is `openai`

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::generator::{DEFAULT_MAX_TOKENS, SupportGenerator};
use crate::providers::GenerateProvider;
use crate::types::GenerateOptions;
use crate::{Result, SolaceError};

/// Environment variable overriding the classifier artifact directory.
pub const MODEL_DIR_ENV: &str = "SOLACE_MODEL_DIR";

const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";
const OPENAI_MODEL_ENV: &str = "OPENAI_MODEL";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
const DEFAULT_OLLAMA_MODEL: &str = "llama3.2";

/// Service configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:8000).
    #[serde(default = "default_address")]
    pub address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
        }
    }
}

fn default_address() -> String {
    "127.0.0.1:8000".to_string()
}

/// Emotion classifier artifacts.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierConfig {
    /// Directory holding `model.onnx`, `tokenizer.json` and `config.json`.
    #[serde(default = "default_model_dir")]
    pub model_dir: PathBuf,
    /// Token budget; longer input is truncated (default: 512).
    #[serde(default = "default_max_length")]
    pub max_length: usize,
    /// Parallel inference sessions; one per core (at most four) when unset.
    #[serde(default)]
    pub sessions: Option<usize>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model_dir: default_model_dir(),
            max_length: default_max_length(),
            sessions: None,
        }
    }
}

fn default_model_dir() -> PathBuf {
    PathBuf::from("../fine_tuned_emotion_model_revised")
}

fn default_max_length() -> usize {
    512
}

/// Which generation backend to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Remote OpenAI chat-completions API.
    #[default]
    OpenAi,
    /// Local Ollama server.
    Ollama,
    /// No backend; every request gets the fallback plan.
    None,
}

/// Generation backend configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default)]
    pub backend: BackendKind,
    /// Model identifier; defaults per backend.
    #[serde(default)]
    pub model: Option<String>,
    /// Output token budget (default: 300).
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
    /// Timeout for one backend call in seconds (default: 20).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Override the backend base URL.
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            model: None,
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout(),
            base_url: None,
            temperature: None,
        }
    }
}

fn default_max_tokens() -> usize {
    DEFAULT_MAX_TOKENS
}

fn default_timeout() -> u64 {
    20
}

impl GeneratorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Configured model, or the backend's default.
    pub fn model_name(&self) -> &str {
        match (&self.model, self.backend) {
            (Some(model), _) => model,
            (None, BackendKind::OpenAi) => DEFAULT_OPENAI_MODEL,
            (None, BackendKind::Ollama) => DEFAULT_OLLAMA_MODEL,
            (None, BackendKind::None) => "none",
        }
    }

    pub fn options(&self) -> GenerateOptions {
        let mut options = GenerateOptions::new(self.model_name()).max_tokens(self.max_tokens);
        if let Some(temperature) = self.temperature {
            options = options.temperature(temperature);
        }
        options
    }
}

impl Config {
    /// Load configuration from the standard locations, then apply environment overrides.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let config = match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path)?,
            None => Self::default(),
        };
        Ok(config.with_env(|key| std::env::var(key).ok()))
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| SolaceError::Configuration(format!("Failed to parse config: {e}")))
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            SolaceError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            SolaceError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    /// Resolve the config file path; `None` means use defaults.
    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(SolaceError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        // User config
        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".solace").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        // System config
        let system_config = PathBuf::from("/etc/solace/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }

    /// Apply environment overrides from a lookup function.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(dir) = lookup(MODEL_DIR_ENV).filter(|d| !d.is_empty()) {
            self.classifier.model_dir = PathBuf::from(dir);
        }
        if self.generator.backend == BackendKind::OpenAi
            && let Some(model) = lookup(OPENAI_MODEL_ENV).filter(|m| !m.is_empty())
        {
            self.generator.model = Some(model);
        }
        self
    }

    /// Build the generator from `OPENAI_API_KEY` and the generator section.
    ///
    /// A missing key for the OpenAI backend is a startup error.
    pub fn build_generator(&self) -> Result<SupportGenerator> {
        self.build_generator_with_key(std::env::var(OPENAI_API_KEY_ENV).ok())
    }

    /// Build the generator with an explicitly supplied API key.
    pub fn build_generator_with_key(&self, api_key: Option<String>) -> Result<SupportGenerator> {
        let cfg = &self.generator;
        let provider: Arc<dyn GenerateProvider> = match cfg.backend {
            BackendKind::None => return Ok(SupportGenerator::without_backend()),
            BackendKind::OpenAi => openai_provider(cfg, api_key)?,
            BackendKind::Ollama => ollama_provider(cfg)?,
        };
        Ok(SupportGenerator::new(provider, cfg.options()).timeout(cfg.timeout()))
    }

    /// Load the ONNX classifier. Failure here must stop the process.
    #[cfg(feature = "onnx")]
    pub fn build_classifier(&self) -> Result<crate::EmotionClassifier> {
        use crate::classifier::onnx::{OnnxEmotionModel, default_session_count};

        let model = OnnxEmotionModel::load_pooled(
            &self.classifier.model_dir,
            self.classifier.max_length,
            self.classifier.sessions.unwrap_or_else(default_session_count),
        )?;
        Ok(crate::EmotionClassifier::new(model))
    }
}

#[cfg(feature = "openai")]
fn openai_provider(
    cfg: &GeneratorConfig,
    api_key: Option<String>,
) -> Result<Arc<dyn GenerateProvider>> {
    use crate::providers::OpenAiClient;

    let key = api_key
        .filter(|k| !k.trim().is_empty())
        .ok_or(SolaceError::MissingApiKey(OPENAI_API_KEY_ENV))?;
    let client = match cfg.base_url {
        Some(ref url) => OpenAiClient::with_base_url(key, url)?,
        None => OpenAiClient::new(key)?,
    };
    Ok(Arc::new(client.timeout(cfg.timeout())?))
}

#[cfg(not(feature = "openai"))]
fn openai_provider(
    _cfg: &GeneratorConfig,
    _api_key: Option<String>,
) -> Result<Arc<dyn GenerateProvider>> {
    Err(SolaceError::Configuration(
        "backend \"openai\" requires the `openai` feature".to_string(),
    ))
}

#[cfg(feature = "ollama")]
fn ollama_provider(cfg: &GeneratorConfig) -> Result<Arc<dyn GenerateProvider>> {
    use crate::providers::OllamaClient;

    let client = match cfg.base_url {
        Some(ref url) => OllamaClient::new(url)?,
        None => OllamaClient::local()?,
    };
    Ok(Arc::new(client.timeout(cfg.timeout())?))
}

#[cfg(not(feature = "ollama"))]
fn ollama_provider(_cfg: &GeneratorConfig) -> Result<Arc<dyn GenerateProvider>> {
    Err(SolaceError::Configuration(
        "backend \"ollama\" requires the `ollama` feature".to_string(),
    ))
}
