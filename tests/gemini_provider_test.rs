//! Gemini generateContent against a mock server.

use genai_client::providers::gemini::{GeminiClient, GeminiConfig};
use genai_client::{ChatMessage, GenerationParams, LlmError, LlmProvider, ProviderType};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn candidate(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP",
            "safetyRatings": [
                {"category": "HARM_CATEGORY_DANGEROUS_CONTENT", "probability": "NEGLIGIBLE"}
            ]
        }],
        "usageMetadata": {"promptTokenCount": 3, "candidatesTokenCount": 4, "totalTokenCount": 7}
    })
}

fn client_for(server: &MockServer) -> GeminiClient {
    let config = GeminiConfig::new("g-key").with_base_url(format!("{}/v1beta", server.uri()));
    GeminiClient::new(config, reqwest::Client::new())
}

#[tokio::test]
async fn generate_maps_params_to_generation_config() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-pro:generateContent"))
        .and(header("x-goog-api-key", "g-key"))
        .and(body_partial_json(json!({
            "contents": [{"role": "user", "parts": [{"text": "Hello"}]}],
            "generationConfig": {"temperature": 0.2, "topP": 0.9, "maxOutputTokens": 1000}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate("Hi there")))
        .expect(1)
        .mount(&server)
        .await;

    let params = GenerationParams::new().with_temperature(0.2);
    let resp = client_for(&server).generate("Hello", &params).await.unwrap();

    assert_eq!(resp.text, "Hi there");
    assert_eq!(resp.provider, ProviderType::Gemini);
    assert_eq!(resp.model, "gemini-pro");
    assert_eq!(resp.usage_u64("totalTokenCount"), Some(7));
    let meta = resp.metadata.unwrap();
    assert_eq!(meta["finish_reason"], "STOP");
    assert_eq!(meta["safety_ratings"][0]["probability"], "NEGLIGIBLE");
}

#[tokio::test]
async fn chat_folds_system_into_first_user_turn() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
        .and(body_partial_json(json!({
            "contents": [
                {"role": "user", "parts": [{"text": "Answer in French.\n\nHello"}]},
                {"role": "model", "parts": [{"text": "Bonjour"}]},
                {"role": "user", "parts": [{"text": "Thanks"}]}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate("Merci")))
        .expect(1)
        .mount(&server)
        .await;

    let messages = [
        ChatMessage::system("Answer in French."),
        ChatMessage::user("Hello"),
        ChatMessage::assistant("Bonjour"),
        ChatMessage::user("Thanks"),
    ];
    let params = GenerationParams::new().with_model("gemini-1.5-flash");
    let resp = client_for(&server).chat(&messages, &params).await.unwrap();
    assert_eq!(resp.text, "Merci");
}

#[tokio::test]
async fn vendor_error_is_generation_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-pro:generateContent"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT"}
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .generate("x", &GenerationParams::new())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LlmError::GenerationError { ref message, status: Some(400), .. } if message == "API key not valid."
    ));
}

#[tokio::test]
async fn health_needs_a_non_empty_model_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1beta/models"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"models": [{"name": "models/gemini-pro"}]})),
        )
        .mount(&server)
        .await;
    assert!(client_for(&server).health_check().await);

    let empty = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1beta/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"models": []})))
        .mount(&empty)
        .await;
    assert!(!client_for(&empty).health_check().await);
}
