//! Emotion classification.
//!
//! [`EmotionClassifier`] turns raw model scores into a [`ClassificationResult`]:
//! softmax over the six labels, argmax with lowest-index tie break. The scores
//! come from any [`EmotionModel`]; the ONNX Runtime backend lives in [`onnx`].

#[cfg(feature = "onnx")]
pub mod onnx;

#[cfg(feature = "onnx")]
pub use onnx::OnnxEmotionModel;

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::telemetry;
use crate::types::{ClassificationResult, EmotionDistribution};
use crate::{Result, SolaceError};

/// A loaded sequence-classification model.
///
/// Implementations hold immutable weights and must be deterministic:
/// the same text always yields the same scores.
pub trait EmotionModel: Send + Sync {
    /// Model name for logging/debugging.
    fn name(&self) -> &str;

    /// Raw scores in [`EmotionLabel::ALL`](crate::EmotionLabel::ALL) order.
    ///
    /// Input longer than the model capacity is truncated, never rejected.
    fn logits(&self, text: &str) -> Result<Vec<f32>>;
}

/// Classifier handle shared across requests.
///
/// Cloning is cheap; all clones share the same loaded model.
#[derive(Clone)]
pub struct EmotionClassifier {
    model: Arc<dyn EmotionModel>,
}

impl EmotionClassifier {
    pub fn new(model: impl EmotionModel + 'static) -> Self {
        Self {
            model: Arc::new(model),
        }
    }

    pub fn from_arc(model: Arc<dyn EmotionModel>) -> Self {
        Self { model }
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Classify a journal entry.
    #[instrument(skip(self, text), fields(model = self.model.name(), text_len = text.len()))]
    pub fn classify(&self, text: &str) -> Result<ClassificationResult> {
        if text.trim().is_empty() {
            return Err(SolaceError::InvalidInput("text must not be empty".to_string()));
        }

        let logits = self.model.logits(text)?;
        let result = ClassificationResult::from_distribution(EmotionDistribution::from_logits(
            &logits,
        )?);

        metrics::counter!(telemetry::CLASSIFICATIONS_TOTAL,
            "emotion" => result.predicted.as_str(),
        )
        .increment(1);
        debug!(
            emotion = %result.predicted,
            confidence = result.distribution.get(result.predicted),
            "classified"
        );

        Ok(result)
    }
}

impl std::fmt::Debug for EmotionClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmotionClassifier")
            .field("model", &self.model.name())
            .finish()
    }
}
