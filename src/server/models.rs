//! Request and response bodies of the REST API

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use crate::client::DEFAULT_BATCH_CONCURRENCY;
use crate::error::LlmError;
use crate::params::GenerationParams;
use crate::types::{ChatMessage, GenerationResponse, ProviderInfo, ProviderType};

use super::error::ApiError;

fn default_concurrency() -> usize {
    DEFAULT_BATCH_CONCURRENCY
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GenerationRequest {
    #[validate(length(min = 1, message = "prompt must not be empty"))]
    pub prompt: String,
    pub provider: String,
    pub model: Option<String>,
    #[validate(range(min = 1))]
    pub max_tokens: Option<u32>,
    #[validate(range(min = 0.0, max = 2.0))]
    pub temperature: Option<f64>,
    #[validate(range(min = 0.0, max = 1.0))]
    pub top_p: Option<f64>,
    /// Sent as a leading system message; the call becomes a chat.
    pub system_prompt: Option<String>,
}

impl GenerationRequest {
    pub fn params(&self) -> GenerationParams {
        GenerationParams {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            top_p: self.top_p,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChatRequest {
    #[validate(length(min = 1, message = "messages must not be empty"))]
    pub messages: Vec<ChatMessage>,
    pub provider: String,
    pub model: Option<String>,
    #[validate(range(min = 1))]
    pub max_tokens: Option<u32>,
    #[validate(range(min = 0.0, max = 2.0))]
    pub temperature: Option<f64>,
    #[validate(range(min = 0.0, max = 1.0))]
    pub top_p: Option<f64>,
}

impl ChatRequest {
    pub fn params(&self) -> GenerationParams {
        GenerationParams {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            top_p: self.top_p,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub message: ChatMessage,
    pub provider: ProviderType,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl From<GenerationResponse> for ChatResponse {
    fn from(resp: GenerationResponse) -> Self {
        Self {
            message: ChatMessage::assistant(resp.text),
            provider: resp.provider,
            model: resp.model,
            usage: resp.usage,
            metadata: resp.metadata,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BatchRequest {
    #[validate(length(min = 1, message = "prompts must not be empty"))]
    pub prompts: Vec<String>,
    pub provider: String,
    pub model: Option<String>,
    #[validate(range(min = 1))]
    pub max_tokens: Option<u32>,
    #[validate(range(min = 0.0, max = 2.0))]
    pub temperature: Option<f64>,
    #[serde(default = "default_concurrency")]
    #[validate(range(min = 1, max = 100))]
    pub concurrent_requests: usize,
}

impl BatchRequest {
    pub fn params(&self) -> GenerationParams {
        GenerationParams {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            top_p: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchResponse {
    /// Successful results only, in prompt order.
    pub results: Vec<GenerationResponse>,
    pub total_processed: usize,
    pub success_count: usize,
    pub error_count: usize,
    /// `Prompt {index}: {error}` per failed prompt.
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub providers: BTreeMap<ProviderType, bool>,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProvidersResponse {
    pub available_providers: Vec<ProviderType>,
    pub provider_info: BTreeMap<ProviderType, ProviderInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelsResponse {
    pub provider: ProviderType,
    pub models: Vec<String>,
}

/// JSON body extractor that also runs `validator` rules.
///
/// Malformed JSON is a 422, a rule violation a 400.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::unprocessable(rejection.body_text()))?;
        value
            .validate()
            .map_err(|e| ApiError::from(LlmError::InvalidInput(e.to_string())))?;
        Ok(Self(value))
    }
}
