//! Generation backend capability.
//!
//! The generator only needs "prompt in, completion text out". Remote APIs and
//! locally hosted models implement the same trait and are picked by
//! configuration.
//!
//! # Example
//!
//! ```ignore
//! struct Canned;
//!
//! #[async_trait]
//! impl GenerateProvider for Canned {
//!     fn name(&self) -> &str { "canned" }
//!
//!     async fn generate(&self, _prompt: &str, _options: &GenerateOptions) -> Result<String> {
//!         Ok("{}".to_string())
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::Result;
use crate::types::GenerateOptions;

/// Provider for single-turn text generation.
#[async_trait]
pub trait GenerateProvider: Send + Sync {
    /// Provider name for logging/debugging.
    fn name(&self) -> &str;

    /// Non-streaming text generation. Returns the raw completion text.
    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<String>;
}
