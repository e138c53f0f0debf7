//! Tests for the Ollama backend.

#![cfg(feature = "ollama")]

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use solace::providers::OllamaClient;
use solace::{EmotionLabel, GenerateOptions, GenerateProvider, SolaceError, SupportGenerator};

#[tokio::test]
async fn test_ollama_generate() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({
            "model": "llama3.2",
            "prompt": "hello",
            "system": "be kind",
            "stream": false,
            "options": {"num_predict": 300}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "llama3.2",
            "response": "{\"ok\": true}",
            "done": true
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = OllamaClient::new(mock_server.uri()).unwrap();
    let options = GenerateOptions::new("llama3.2")
        .max_tokens(300)
        .system("be kind");
    let text = client.generate("hello", &options).await.unwrap();
    assert_eq!(text, "{\"ok\": true}");
    assert_eq!(client.name(), "ollama");
}

#[tokio::test]
async fn test_ollama_model_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"error": "model 'nope' not found"})),
        )
        .mount(&mock_server)
        .await;

    let client = OllamaClient::new(mock_server.uri()).unwrap();
    let err = client
        .generate("hello", &GenerateOptions::new("nope"))
        .await
        .unwrap_err();
    match err {
        SolaceError::ModelNotFound(model) => assert_eq!(model, "nope"),
        other => panic!("expected ModelNotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn test_ollama_empty_text_is_returned_as_is() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "", "done": true})))
        .mount(&mock_server)
        .await;

    let client = OllamaClient::new(mock_server.uri()).unwrap();
    let text = client
        .generate("hello", &GenerateOptions::new("llama3.2"))
        .await
        .unwrap();
    assert_eq!(text, "");
}

#[tokio::test]
async fn test_ollama_missing_response_field() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"done": true})))
        .mount(&mock_server)
        .await;

    let client = OllamaClient::new(mock_server.uri()).unwrap();
    let err = client
        .generate("hello", &GenerateOptions::new("llama3.2"))
        .await
        .unwrap_err();
    assert!(matches!(err, SolaceError::EmptyResponse));
}

#[tokio::test]
async fn test_generator_degrades_on_blank_ollama_reply() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "\n", "done": true})))
        .mount(&mock_server)
        .await;

    let client = Arc::new(OllamaClient::new(mock_server.uri()).unwrap());
    let generator = SupportGenerator::new(client, GenerateOptions::new("llama3.2"));

    let plan = generator.generate(EmotionLabel::Love, "grateful").await;
    assert_eq!(plan.as_degraded().unwrap().raw_response, "\n");
}

#[tokio::test]
async fn test_ollama_client_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"response": "late", "done": true}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&mock_server)
        .await;

    let client = OllamaClient::new(mock_server.uri())
        .unwrap()
        .timeout(Duration::from_millis(200))
        .unwrap();
    let err = client
        .generate("hello", &GenerateOptions::new("llama3.2"))
        .await
        .unwrap_err();
    assert!(matches!(err, SolaceError::Http(_)));
}
