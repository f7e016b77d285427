//! REST API routes driven through `tower::ServiceExt::oneshot`.

#![cfg(feature = "server")]

mod support;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use genai_client::server::{REQUEST_ID_HEADER, router};
use genai_client::{GenAiClient, ProviderType};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use support::{Health, MockProvider};
use tower::util::ServiceExt;

fn app() -> axum::Router {
    let client = GenAiClient::builder()
        .with_provider(MockProvider::new(ProviderType::OpenAi).into_arc())
        .with_provider(
            MockProvider::new(ProviderType::Gemini)
                .with_health(Health::Down)
                .failing_on("boom")
                .into_arc(),
        )
        .build();
    router(Arc::new(client))
}

async fn send(request: Request<Body>) -> (StatusCode, Value, axum::http::HeaderMap) {
    let response = app().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body, headers)
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn health_reports_every_provider() {
    let (status, body, headers) = send(get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["providers"]["openai"], true);
    assert_eq!(body["providers"]["gemini"], false);
    assert!(body["timestamp"].as_str().unwrap().contains('T'));
    assert!(headers.contains_key(REQUEST_ID_HEADER));
}

#[tokio::test]
async fn generate_returns_the_response() {
    let (status, body, _) = send(post(
        "/generate",
        json!({"prompt": "hello", "provider": "openai", "model": "mock-large"}),
    ))
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], "HELLO");
    assert_eq!(body["provider"], "openai");
    assert_eq!(body["model"], "mock-large");
}

#[tokio::test]
async fn generate_with_unconfigured_provider_is_404() {
    let (status, body, _) =
        send(post("/generate", json!({"prompt": "hello", "provider": "bedrock"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Provider bedrock is not available");
}

#[tokio::test]
async fn empty_prompt_is_400() {
    let (status, body, _) =
        send(post("/generate", json!({"prompt": "", "provider": "openai"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("prompt"));
}

#[tokio::test]
async fn malformed_body_is_422() {
    let (status, body, _) = send(post("/generate", json!({"provider": "openai"}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn generation_failure_is_500() {
    let (status, body, _) =
        send(post("/generate", json!({"prompt": "boom", "provider": "gemini"}))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"].as_str().unwrap().contains("mock failure"));
}

#[tokio::test]
async fn chat_wraps_reply_as_assistant_message() {
    let (status, body, _) = send(post(
        "/chat",
        json!({
            "provider": "openai",
            "messages": [
                {"role": "system", "content": "Be brief."},
                {"role": "user", "content": "hi"}
            ]
        }),
    ))
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"]["role"], "assistant");
    assert_eq!(body["message"]["content"], "HI");
    assert_eq!(body["provider"], "openai");
}

#[tokio::test]
async fn batch_separates_results_and_errors() {
    let (status, body, _) = send(post(
        "/batch",
        json!({"provider": "gemini", "prompts": ["a", "boom", "c"], "concurrent_requests": 2}),
    ))
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_processed"], 3);
    assert_eq!(body["success_count"], 2);
    assert_eq!(body["error_count"], 1);
    assert_eq!(body["results"][0]["text"], "A");
    assert_eq!(body["results"][1]["text"], "C");
    assert!(body["errors"][0].as_str().unwrap().starts_with("Prompt 1:"));
}

#[tokio::test]
async fn batch_rejects_zero_concurrency() {
    let (status, _, _) = send(post(
        "/batch",
        json!({"provider": "openai", "prompts": ["a"], "concurrent_requests": 0}),
    ))
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn providers_lists_registry() {
    let (status, body, _) = send(get("/providers")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available_providers"], json!(["openai", "gemini"]));
    assert_eq!(body["provider_info"]["gemini"]["provider_name"], "gemini");
    assert_eq!(body["provider_info"]["openai"]["available"], true);
}

#[tokio::test]
async fn provider_models_route() {
    let (status, body, _) = send(get("/providers/openai/models")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["provider"], "openai");
    assert_eq!(body["models"], json!(["mock-small", "mock-large"]));

    let (status, body, _) = send(get("/providers/cohere/models")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Provider cohere is not available");
}
