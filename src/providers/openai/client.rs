//! `OpenAI` Client Implementation
//!
//! Chat Completions API over plain HTTP. `generate` is a chat call with a
//! single user message.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value, json};

use crate::config::Settings;
use crate::error::{LlmError, Result};
use crate::params::{GenerationParams, SamplingDefaults};
use crate::provider::LlmProvider;
use crate::transport::{HttpTransport, join_url};
use crate::types::{ChatMessage, GenerationResponse, ProviderType};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const OPENAI_MODELS: &[&str] = &[
    "gpt-4",
    "gpt-4-turbo-preview",
    "gpt-3.5-turbo",
    "gpt-3.5-turbo-16k",
];

/// `OpenAI` configuration
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: SecretString,
    pub base_url: String,
    pub default_model: String,
    pub sampling: SamplingDefaults,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            base_url: OPENAI_BASE_URL.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            sampling: SamplingDefaults::default(),
        }
    }

    /// Read the key, base URL and sampling defaults from settings.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let api_key = settings
            .openai_api_key
            .clone()
            .ok_or_else(|| LlmError::ConfigurationError("OpenAI API key is required".into()))?;
        Ok(Self {
            api_key,
            base_url: settings
                .openai_base_url
                .clone()
                .unwrap_or_else(|| OPENAI_BASE_URL.to_string()),
            default_model: DEFAULT_MODEL.to_string(),
            sampling: settings.sampling,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    pub fn with_sampling(mut self, sampling: SamplingDefaults) -> Self {
        self.sampling = sampling;
        self
    }
}

/// `OpenAI` Client
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    config: OpenAiConfig,
    transport: HttpTransport,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig, http_client: reqwest::Client) -> Self {
        Self {
            config,
            transport: HttpTransport::new(ProviderType::OpenAi, http_client),
        }
    }

    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let bearer = format!("Bearer {}", self.config.api_key.expose_secret());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&bearer).map_err(|e| {
                LlmError::ConfigurationError(format!("Invalid OpenAI API key: {e}"))
            })?,
        );
        Ok(headers)
    }

    async fn chat_completion(
        &self,
        messages: Vec<Value>,
        params: &GenerationParams,
    ) -> Result<GenerationResponse> {
        let resolved = params.resolve(&self.config.default_model, &self.config.sampling);
        let body = json!({
            "model": resolved.model,
            "messages": messages,
            "max_tokens": resolved.max_tokens,
            "temperature": resolved.temperature,
            "top_p": resolved.top_p,
        });

        let url = join_url(&self.config.base_url, "chat/completions");
        let response = self
            .transport
            .post_json(&url, self.headers()?, &body)
            .await?;
        parse_chat_completion(&response, &resolved.model)
    }
}

/// Map a Chat Completions body onto a `GenerationResponse`.
pub(crate) fn parse_chat_completion(body: &Value, model: &str) -> Result<GenerationResponse> {
    let choice = body
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|c| c.first())
        .ok_or_else(|| LlmError::ParseError("OpenAI response has no choices".into()))?;

    // `content` is null when the model answers with tool calls only.
    let text = choice
        .pointer("/message/content")
        .and_then(Value::as_str)
        .unwrap_or_default();

    let usage = body.get("usage").and_then(Value::as_object).cloned();

    let mut metadata = Map::new();
    metadata.insert(
        "finish_reason".into(),
        choice.get("finish_reason").cloned().unwrap_or(Value::Null),
    );
    metadata.insert(
        "response_id".into(),
        body.get("id").cloned().unwrap_or(Value::Null),
    );
    if let Some(fp) = body.get("system_fingerprint").filter(|v| !v.is_null()) {
        metadata.insert("system_fingerprint".into(), fp.clone());
    }

    Ok(GenerationResponse::new(text, ProviderType::OpenAi, model)
        .with_usage(usage)
        .with_metadata(Some(metadata)))
}

#[async_trait]
impl LlmProvider for OpenAiClient {
    fn provider_type(&self) -> ProviderType {
        ProviderType::OpenAi
    }

    fn supported_models(&self) -> Vec<String> {
        OPENAI_MODELS.iter().map(|m| m.to_string()).collect()
    }

    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<GenerationResponse> {
        let messages = vec![json!({ "role": "user", "content": prompt })];
        self.chat_completion(messages, params).await
    }

    async fn chat(
        &self,
        messages: &[ChatMessage],
        params: &GenerationParams,
    ) -> Result<GenerationResponse> {
        let messages = messages
            .iter()
            .map(|m| json!({ "role": m.role.as_str(), "content": m.content }))
            .collect();
        self.chat_completion(messages, params).await
    }

    async fn health_check(&self) -> bool {
        let headers = match self.headers() {
            Ok(h) => h,
            Err(_) => return false,
        };
        let url = join_url(&self.config.base_url, "models");
        match self.transport.get_json(&url, headers).await {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!(error = %e, "OpenAI health check failed");
                false
            }
        }
    }
}
