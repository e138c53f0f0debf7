//! Classify, then generate: the full journal-entry pipeline.

use tracing::{info_span, instrument};

use crate::classifier::EmotionClassifier;
use crate::generator::SupportGenerator;
use crate::types::{ClassificationResult, PipelineResult};
use crate::{Result, SolaceError};

/// Orchestrates classification and support-plan generation.
///
/// Holds the process-lifetime classifier and generator handles; it keeps no
/// per-request state, so one instance serves all requests concurrently.
#[derive(Debug)]
pub struct Pipeline {
    classifier: EmotionClassifier,
    generator: SupportGenerator,
}

impl Pipeline {
    pub fn new(classifier: EmotionClassifier, generator: SupportGenerator) -> Self {
        Self {
            classifier,
            generator,
        }
    }

    pub fn classifier(&self) -> &EmotionClassifier {
        &self.classifier
    }

    pub fn generator(&self) -> &SupportGenerator {
        &self.generator
    }

    /// Classify text on the blocking pool so inference does not stall the executor.
    pub async fn classify(&self, text: &str) -> Result<ClassificationResult> {
        let classifier = self.classifier.clone();
        let text = text.to_owned();
        let span = info_span!("classify_blocking");

        tokio::task::spawn_blocking(move || span.in_scope(|| classifier.classify(&text)))
            .await
            .map_err(|e| SolaceError::Inference(format!("classification task failed: {e}")))?
    }

    /// Run both stages and assemble the result envelope.
    ///
    /// Only classification can fail; generation always yields a plan.
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    pub async fn run(&self, text: &str) -> Result<PipelineResult> {
        let classification = self.classify(text).await?;

        let support_plan = self
            .generator
            .generate(classification.predicted, text)
            .await;

        Ok(PipelineResult {
            text: text.to_string(),
            predicted_emotion: classification.predicted,
            probabilities: classification.distribution,
            support_plan,
        })
    }
}
