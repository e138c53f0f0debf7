//! Pipeline output envelope.

use serde::{Deserialize, Serialize};

use super::{EmotionDistribution, EmotionLabel, SupportPlan};

/// Full result for one journal entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    /// The input text, unchanged.
    pub text: String,
    pub predicted_emotion: EmotionLabel,
    pub probabilities: EmotionDistribution,
    pub support_plan: SupportPlan,
}
