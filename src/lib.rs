//! Solace - emotion classification and supportive response plans
//!
//! A journal entry is classified into one of six emotions by a local
//! sequence-classification model, then a generation backend is prompted for
//! a structured [`SupportPlan`]: a message, three activities and an optional
//! breathing-timer directive. Backend failures fall back to a deterministic
//! plan; malformed backend output is surfaced as a degraded plan.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! use solace::classifier::OnnxEmotionModel;
//! use solace::providers::OpenAiClient;
//! use solace::{EmotionClassifier, GenerateOptions, Pipeline, SupportGenerator};
//!
//! #[tokio::main]
//! async fn main() -> solace::Result<()> {
//!     let model = OnnxEmotionModel::load(Path::new("models/emotion"), 512)?;
//!     let backend = Arc::new(OpenAiClient::new("sk-your-key")?);
//!     let pipeline = Pipeline::new(
//!         EmotionClassifier::new(model),
//!         SupportGenerator::new(backend, GenerateOptions::new("gpt-4o-mini").max_tokens(300)),
//!     );
//!
//!     let result = pipeline.run("I feel anxious and overwhelmed before my exam.").await?;
//!     println!("{}", result.predicted_emotion);
//!     Ok(())
//! }
//! ```

pub mod classifier;
pub mod config;
pub mod error;
pub mod generator;
pub mod pipeline;
pub mod prompt;
pub mod providers;
pub mod sanitize;
pub mod schema;
#[cfg(feature = "server")]
pub mod server;
pub mod telemetry;
pub mod types;

// Re-export main types at crate root
pub use classifier::{EmotionClassifier, EmotionModel};
pub use config::Config;
pub use error::{Result, SolaceError};
pub use generator::{SupportGenerator, fallback_plan};
pub use pipeline::Pipeline;
pub use prompt::PromptBuilder;
pub use providers::GenerateProvider;
pub use schema::SupportPlanSchema;

// Re-export all types
pub use types::{
    ActionDirective, ClassificationResult, CycleType, DegradedPlan, EmotionDistribution,
    EmotionLabel, GenerateOptions, PipelineResult, PlanBody, SupportPlan,
};
