//! End-to-end tests for the classify-then-generate pipeline.

use std::sync::Arc;

use async_trait::async_trait;

use solace::{
    EmotionClassifier, EmotionLabel, EmotionModel, GenerateOptions, GenerateProvider, Pipeline,
    Result, SolaceError, SupportGenerator, SupportPlan, fallback_plan,
};

// ============================================================================
// Mocks
// ============================================================================

struct KeywordModel;

impl EmotionModel for KeywordModel {
    fn name(&self) -> &str {
        "keyword"
    }

    fn logits(&self, text: &str) -> Result<Vec<f32>> {
        let lower = text.to_lowercase();
        let mut logits = vec![0.0; EmotionLabel::COUNT];
        if lower.contains("anxious") || lower.contains("overwhelmed") {
            logits[EmotionLabel::Fear.index()] += 5.0;
        }
        if lower.contains("happy") {
            logits[EmotionLabel::Joy.index()] += 5.0;
        }
        Ok(logits)
    }
}

struct BrokenModel;

impl EmotionModel for BrokenModel {
    fn name(&self) -> &str {
        "broken"
    }

    fn logits(&self, _text: &str) -> Result<Vec<f32>> {
        Err(SolaceError::Inference("session poisoned".to_string()))
    }
}

struct UnreachableProvider;

#[async_trait]
impl GenerateProvider for UnreachableProvider {
    fn name(&self) -> &str {
        "unreachable"
    }

    async fn generate(&self, _prompt: &str, _options: &GenerateOptions) -> Result<String> {
        Err(SolaceError::Http("network unreachable".to_string()))
    }
}

fn pipeline(model: impl EmotionModel + 'static) -> Pipeline {
    Pipeline::new(
        EmotionClassifier::new(model),
        SupportGenerator::new(
            Arc::new(UnreachableProvider),
            GenerateOptions::new("gpt-4o-mini"),
        ),
    )
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn anxious_entry_with_unreachable_backend() {
    let text = "I feel anxious and overwhelmed before my exam.";
    let result = pipeline(KeywordModel).run(text).await.unwrap();

    assert_eq!(result.text, text);
    assert_eq!(result.predicted_emotion, EmotionLabel::Fear);
    assert!((result.probabilities.sum() - 1.0).abs() < 1e-4);

    let plan = result.support_plan.as_plan().expect("fallback plan");
    assert!(plan.actions.suggest_breathing_timer);
    assert_eq!(plan.actions.recommended_duration, 60);
    assert_eq!(plan.activities.len(), 3);
}

#[tokio::test]
async fn happy_entry_with_unreachable_backend() {
    let result = pipeline(KeywordModel)
        .run("So happy today!")
        .await
        .unwrap();

    assert_eq!(result.predicted_emotion, EmotionLabel::Joy);
    assert_eq!(
        result.support_plan,
        SupportPlan::Plan(fallback_plan(EmotionLabel::Joy))
    );
    assert!(
        !result
            .support_plan
            .as_plan()
            .unwrap()
            .actions
            .suggest_breathing_timer
    );
}

#[tokio::test]
async fn prediction_is_argmax_of_probabilities() {
    let result = pipeline(KeywordModel)
        .run("Nothing special, a quiet evening.")
        .await
        .unwrap();
    assert_eq!(result.probabilities.argmax(), result.predicted_emotion);
}

#[tokio::test]
async fn classification_failure_propagates() {
    let err = pipeline(BrokenModel).run("anything").await.unwrap_err();
    assert!(matches!(err, SolaceError::Inference(_)));
}

#[tokio::test]
async fn empty_text_is_invalid_input() {
    let err = pipeline(KeywordModel).run("  ").await.unwrap_err();
    assert!(matches!(err, SolaceError::InvalidInput(_)));
}

#[tokio::test]
async fn classify_only() {
    let result = pipeline(KeywordModel)
        .classify("overwhelmed by work")
        .await
        .unwrap();
    assert_eq!(result.predicted, EmotionLabel::Fear);
}

#[tokio::test]
async fn result_serializes_with_label_keys() {
    let result = pipeline(KeywordModel).run("So happy today!").await.unwrap();
    let value = serde_json::to_value(&result).unwrap();

    assert_eq!(value["predicted_emotion"], "joy");
    let probs = value["probabilities"].as_object().unwrap();
    assert_eq!(probs.len(), 6);
    for label in EmotionLabel::ALL {
        assert!(probs.contains_key(label.as_str()));
    }
    assert_eq!(value["support_plan"]["actions"]["cycle_type"], "inhale_exhale");
}

#[tokio::test]
async fn concurrent_requests_share_one_pipeline() {
    let pipeline = Arc::new(pipeline(KeywordModel));
    let mut handles = Vec::new();
    for i in 0..8 {
        let pipeline = pipeline.clone();
        handles.push(tokio::spawn(async move {
            let text = if i % 2 == 0 { "anxious" } else { "happy" };
            pipeline.run(text).await.unwrap().predicted_emotion
        }));
    }

    for (i, handle) in handles.into_iter().enumerate() {
        let expected = if i % 2 == 0 {
            EmotionLabel::Fear
        } else {
            EmotionLabel::Joy
        };
        assert_eq!(handle.await.unwrap(), expected);
    }
}
