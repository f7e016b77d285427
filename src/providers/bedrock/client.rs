//! Amazon Bedrock client
//!
//! Calls `InvokeModel` directly over HTTP with a Bedrock API key. The request
//! and response shapes depend on the model family, see [`ModelFamily`].

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde_json::Value;

use crate::error::{LlmError, Result};
use crate::params::GenerationParams;
use crate::provider::LlmProvider;
use crate::transport::{HttpTransport, join_url};
use crate::types::{ChatMessage, GenerationResponse, ProviderType};

use super::config::BedrockConfig;
use super::family::ModelFamily;

pub const BEDROCK_MODELS: &[&str] = &[
    "anthropic.claude-3-sonnet-20240229-v1:0",
    "anthropic.claude-3-haiku-20240307-v1:0",
    "anthropic.claude-v2:1",
    "amazon.titan-text-express-v1",
    "amazon.titan-text-lite-v1",
    "ai21.j2-ultra-v1",
    "ai21.j2-mid-v1",
];

/// Amazon Bedrock client
#[derive(Debug, Clone)]
pub struct BedrockClient {
    config: BedrockConfig,
    transport: HttpTransport,
}

impl BedrockClient {
    pub fn new(config: BedrockConfig, http_client: reqwest::Client) -> Self {
        Self {
            config,
            transport: HttpTransport::new(ProviderType::Bedrock, http_client),
        }
    }

    pub fn config(&self) -> &BedrockConfig {
        &self.config
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let bearer = format!("Bearer {}", self.config.api_key.expose_secret());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&bearer).map_err(|e| {
                LlmError::ConfigurationError(format!("Invalid Bedrock API key: {e}"))
            })?,
        );
        Ok(headers)
    }

    fn invoke_url(&self, model: &str) -> String {
        join_url(
            &self.config.runtime_url,
            &format!("model/{}/invoke", urlencoding::encode(model)),
        )
    }

    async fn invoke(
        &self,
        model: &str,
        family: ModelFamily,
        body: Value,
    ) -> Result<GenerationResponse> {
        tracing::debug!(model, ?family, "invoking Bedrock model");
        let response = self
            .transport
            .post_json(&self.invoke_url(model), self.headers()?, &body)
            .await?;
        family.parse_response(&response, model)
    }
}

#[async_trait]
impl LlmProvider for BedrockClient {
    fn provider_type(&self) -> ProviderType {
        ProviderType::Bedrock
    }

    fn supported_models(&self) -> Vec<String> {
        BEDROCK_MODELS.iter().map(|m| m.to_string()).collect()
    }

    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<GenerationResponse> {
        let resolved = params.resolve(&self.config.default_model, &self.config.sampling);
        // Rejected before any network traffic.
        let family = ModelFamily::detect(&resolved.model)?;
        let body = family.prompt_body(prompt, &resolved);
        self.invoke(&resolved.model, family, body).await
    }

    async fn chat(
        &self,
        messages: &[ChatMessage],
        params: &GenerationParams,
    ) -> Result<GenerationResponse> {
        let resolved = params.resolve(&self.config.default_model, &self.config.sampling);
        let family = ModelFamily::detect(&resolved.model)?;
        let body = family.chat_body(messages, &resolved)?;
        self.invoke(&resolved.model, family, body).await
    }

    async fn health_check(&self) -> bool {
        let headers = match self.headers() {
            Ok(h) => h,
            Err(_) => return false,
        };
        let url = join_url(&self.config.control_url, "foundation-models");
        match self.transport.get_json(&url, headers).await {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!(error = %e, "Bedrock health check failed");
                false
            }
        }
    }
}
