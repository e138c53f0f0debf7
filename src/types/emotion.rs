//! Emotion labels and classifier output.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::SolaceError;

/// Emotion category predicted by the classifier.
///
/// Declaration order is the classifier's output index order and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionLabel {
    Sadness,
    Joy,
    Love,
    Anger,
    Fear,
    Surprise,
}

impl EmotionLabel {
    /// All labels in model output order.
    pub const ALL: [EmotionLabel; 6] = [
        Self::Sadness,
        Self::Joy,
        Self::Love,
        Self::Anger,
        Self::Fear,
        Self::Surprise,
    ];

    /// Number of labels the classifier head must produce.
    pub const COUNT: usize = Self::ALL.len();

    /// Position of this label in the model output.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Label at a model output position.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sadness => "sadness",
            Self::Joy => "joy",
            Self::Love => "love",
            Self::Anger => "anger",
            Self::Fear => "fear",
            Self::Surprise => "surprise",
        }
    }

    /// Emotions for which the fallback plan proposes a breathing timer.
    pub fn benefits_from_breathing(self) -> bool {
        matches!(self, Self::Fear | Self::Anger | Self::Sadness)
    }
}

impl fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmotionLabel {
    type Err = SolaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|label| label.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SolaceError::InvalidInput(format!("unknown emotion label: {s}")))
    }
}

/// Probability for each of the six labels.
///
/// Serialized as a `{label: probability}` map with exactly six keys.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<EmotionLabel, f32>",
    into = "BTreeMap<EmotionLabel, f32>"
)]
pub struct EmotionDistribution {
    probs: [f32; EmotionLabel::COUNT],
}

impl EmotionDistribution {
    /// Wrap an already-normalized probability vector in label order.
    pub fn from_probabilities(probs: [f32; EmotionLabel::COUNT]) -> Self {
        Self { probs }
    }

    /// Normalize raw model scores with softmax.
    ///
    /// Fails if the score vector does not match the label set.
    pub fn from_logits(logits: &[f32]) -> crate::Result<Self> {
        if logits.len() != EmotionLabel::COUNT {
            return Err(SolaceError::Inference(format!(
                "expected {} logits, got {}",
                EmotionLabel::COUNT,
                logits.len()
            )));
        }

        let mut probs = [0.0; EmotionLabel::COUNT];
        for (slot, p) in probs.iter_mut().zip(softmax(logits)) {
            *slot = p;
        }
        Ok(Self { probs })
    }

    pub fn get(&self, label: EmotionLabel) -> f32 {
        self.probs[label.index()]
    }

    /// `(label, probability)` pairs in label order.
    pub fn iter(&self) -> impl Iterator<Item = (EmotionLabel, f32)> + '_ {
        EmotionLabel::ALL.into_iter().zip(self.probs.iter().copied())
    }

    /// Most probable label; exact ties resolve to the lowest index.
    pub fn argmax(&self) -> EmotionLabel {
        let mut best = 0;
        for (i, p) in self.probs.iter().enumerate().skip(1) {
            if *p > self.probs[best] {
                best = i;
            }
        }
        EmotionLabel::ALL[best]
    }

    pub fn sum(&self) -> f32 {
        self.probs.iter().sum()
    }
}

impl TryFrom<BTreeMap<EmotionLabel, f32>> for EmotionDistribution {
    type Error = String;

    fn try_from(map: BTreeMap<EmotionLabel, f32>) -> Result<Self, Self::Error> {
        let mut probs = [0.0; EmotionLabel::COUNT];
        for label in EmotionLabel::ALL {
            probs[label.index()] = *map
                .get(&label)
                .ok_or_else(|| format!("missing probability for {label}"))?;
        }
        Ok(Self { probs })
    }
}

impl From<EmotionDistribution> for BTreeMap<EmotionLabel, f32> {
    fn from(dist: EmotionDistribution) -> Self {
        dist.iter().collect()
    }
}

/// Softmax function.
fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|x| (x - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.iter().map(|x| x / sum).collect()
}

/// Output of a single classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub predicted: EmotionLabel,
    pub distribution: EmotionDistribution,
}

impl ClassificationResult {
    /// Build a result whose prediction is the distribution's argmax.
    pub fn from_distribution(distribution: EmotionDistribution) -> Self {
        Self {
            predicted: distribution.argmax(),
            distribution,
        }
    }
}
