//! Tests for the ONNX emotion model loader.

#![cfg(feature = "onnx")]

use std::fs;
use std::path::PathBuf;

use solace::classifier::OnnxEmotionModel;
use solace::{EmotionClassifier, EmotionLabel, SolaceError};

fn assert_unavailable(result: solace::Result<OnnxEmotionModel>, needle: &str) {
    match result {
        Err(SolaceError::ModelUnavailable(msg)) => {
            assert!(msg.contains(needle), "unexpected message: {msg}")
        }
        Err(other) => panic!("expected ModelUnavailable, got {other:?}"),
        Ok(_) => panic!("expected ModelUnavailable, got a model"),
    }
}

#[test]
fn missing_directory_is_model_unavailable() {
    let result = OnnxEmotionModel::load(&PathBuf::from("/nonexistent/emotion-model"), 512);
    assert_unavailable(result, "Model directory not found");
}

#[test]
fn missing_onnx_file_is_model_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("tokenizer.json"), "{}").unwrap();

    assert_unavailable(OnnxEmotionModel::load(dir.path(), 512), "No model.onnx");
}

#[test]
fn missing_tokenizer_is_model_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("onnx")).unwrap();
    fs::write(dir.path().join("onnx").join("model.onnx"), b"").unwrap();

    assert_unavailable(OnnxEmotionModel::load(dir.path(), 512), "Tokenizer not found");
}

#[test]
fn incompatible_label_set_is_model_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("model.onnx"), b"").unwrap();
    fs::write(dir.path().join("tokenizer.json"), "{}").unwrap();
    fs::write(
        dir.path().join("config.json"),
        r#"{"model_type": "distilbert", "id2label": {"0": "negative", "1": "positive"}}"#,
    )
    .unwrap();

    assert_unavailable(OnnxEmotionModel::load(dir.path(), 512), "2 labels");
}

#[test]
fn corrupt_tokenizer_is_model_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("model.onnx"), b"").unwrap();
    fs::write(dir.path().join("tokenizer.json"), "not a tokenizer").unwrap();

    assert_unavailable(OnnxEmotionModel::load(dir.path(), 512), "tokenizer");
}

// Live test - requires an exported model, run with --ignored
#[test]
#[ignore]
fn test_onnx_emotion_inference() {
    let dir = std::env::var("SOLACE_MODEL_DIR").expect("set SOLACE_MODEL_DIR");
    let model = OnnxEmotionModel::load(&PathBuf::from(dir), 512).unwrap();
    let classifier = EmotionClassifier::new(model);

    let result = classifier
        .classify("I feel anxious and overwhelmed before my exam.")
        .unwrap();
    assert_eq!(result.predicted, EmotionLabel::Fear);
    assert!((result.distribution.sum() - 1.0).abs() < 1e-4);

    // far beyond the token budget: truncated, not rejected
    let long = "I am so happy today. ".repeat(2000);
    let result = classifier.classify(&long).unwrap();
    assert_eq!(result.predicted, EmotionLabel::Joy);
}

#[test]
#[ignore]
fn test_onnx_pooled_sessions() {
    let dir = std::env::var("SOLACE_MODEL_DIR").expect("set SOLACE_MODEL_DIR");
    let model = OnnxEmotionModel::load_pooled(&PathBuf::from(dir), 128, 2).unwrap();
    assert_eq!(model.session_count(), 2);

    let classifier = std::sync::Arc::new(EmotionClassifier::new(model));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let classifier = classifier.clone();
            std::thread::spawn(move || classifier.classify("What a wonderful surprise!").unwrap())
        })
        .collect();
    for handle in handles {
        assert!((handle.join().unwrap().distribution.sum() - 1.0).abs() < 1e-4);
    }
}
