use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};

use crate::batch::BatchReport;
use crate::client::GenAiClient;
use crate::types::{ChatMessage, GenerationResponse};

use super::error::ApiError;
use super::models::{
    BatchRequest, BatchResponse, ChatRequest, ChatResponse, GenerationRequest, HealthResponse,
    ModelsResponse, ProvidersResponse, ValidatedJson,
};

type AppState = State<Arc<GenAiClient>>;

pub async fn health(State(client): AppState) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        providers: client.health_check_all().await,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

pub async fn generate(
    State(client): AppState,
    ValidatedJson(req): ValidatedJson<GenerationRequest>,
) -> Result<Json<GenerationResponse>, ApiError> {
    let provider = client.resolve_provider(&req.provider)?;
    tracing::info!(
        %provider,
        model = req.model.as_deref().unwrap_or("default"),
        prompt_length = req.prompt.len(),
        "Text generation request"
    );

    let params = req.params();
    let response = match req.system_prompt.as_deref().filter(|s| !s.is_empty()) {
        Some(system) => {
            let messages = [ChatMessage::system(system), ChatMessage::user(&req.prompt)];
            client.chat(provider, &messages, &params).await?
        }
        None => client.generate(provider, &req.prompt, &params).await?,
    };

    tracing::info!(
        %provider,
        model = %response.model,
        response_length = response.text.len(),
        "Text generation completed"
    );
    Ok(Json(response))
}

pub async fn chat(
    State(client): AppState,
    ValidatedJson(req): ValidatedJson<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let provider = client.resolve_provider(&req.provider)?;
    tracing::info!(
        %provider,
        model = req.model.as_deref().unwrap_or("default"),
        message_count = req.messages.len(),
        "Chat completion request"
    );

    let response = client.chat(provider, &req.messages, &req.params()).await?;
    Ok(Json(response.into()))
}

pub async fn batch(
    State(client): AppState,
    ValidatedJson(req): ValidatedJson<BatchRequest>,
) -> Result<Json<BatchResponse>, ApiError> {
    let provider = client.resolve_provider(&req.provider)?;
    let outcome = client
        .batch_generate(
            provider,
            &req.prompts,
            &req.params(),
            req.concurrent_requests,
        )
        .await;

    let report = BatchReport::from_outcome(&req.prompts, &outcome);
    let results = outcome.into_iter().filter_map(|r| r.ok()).collect();

    Ok(Json(BatchResponse {
        total_processed: report.total,
        success_count: report.successes,
        error_count: report.failures,
        results,
        errors: report
            .errors
            .into_iter()
            .map(|e| format!("Prompt {}: {}", e.index, e.error))
            .collect(),
    }))
}

pub async fn providers(State(client): AppState) -> Json<ProvidersResponse> {
    Json(ProvidersResponse {
        available_providers: client.available_providers(),
        provider_info: client.provider_info(),
    })
}

pub async fn provider_models(
    State(client): AppState,
    Path(provider): Path<String>,
) -> Result<Json<ModelsResponse>, ApiError> {
    let provider = client.resolve_provider(&provider)?;
    Ok(Json(ModelsResponse {
        provider,
        models: client.available_models(provider)?,
    }))
}
