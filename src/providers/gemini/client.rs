//! Gemini client implementation

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use secrecy::ExposeSecret;
use serde_json::{Map, Value, json};

use crate::error::{LlmError, Result};
use crate::params::GenerationParams;
use crate::provider::LlmProvider;
use crate::transport::{HttpTransport, join_url};
use crate::types::{ChatMessage, GenerationResponse, ProviderType};

use super::convert::build_contents;
use super::types::{
    Content, GenerateContentRequest, GenerateContentResponse, GeminiConfig, GenerationConfig,
    ListModelsResponse,
};

pub const GEMINI_MODELS: &[&str] = &[
    "gemini-pro",
    "gemini-pro-vision",
    "gemini-1.5-pro",
    "gemini-1.5-flash",
];

const API_KEY_HEADER: HeaderName = HeaderName::from_static("x-goog-api-key");

/// Google Gemini client
#[derive(Debug, Clone)]
pub struct GeminiClient {
    config: GeminiConfig,
    transport: HttpTransport,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig, http_client: reqwest::Client) -> Self {
        Self {
            config,
            transport: HttpTransport::new(ProviderType::Gemini, http_client),
        }
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            API_KEY_HEADER,
            HeaderValue::from_str(self.config.api_key.expose_secret()).map_err(|e| {
                LlmError::ConfigurationError(format!("Invalid Gemini API key: {e}"))
            })?,
        );
        Ok(headers)
    }

    async fn generate_content(
        &self,
        contents: Vec<Content>,
        params: &GenerationParams,
    ) -> Result<GenerationResponse> {
        let resolved = params.resolve(&self.config.default_model, &self.config.sampling);
        let request = GenerateContentRequest {
            contents,
            generation_config: GenerationConfig {
                temperature: resolved.temperature,
                top_p: resolved.top_p,
                max_output_tokens: resolved.max_tokens,
            },
        };

        let model_path = resolved
            .model
            .strip_prefix("models/")
            .unwrap_or(&resolved.model);
        let url = join_url(
            &self.config.base_url,
            &format!("models/{}:generateContent", urlencoding::encode(model_path)),
        );
        let body = serde_json::to_value(&request)?;
        let response = self.transport.post_json(&url, self.headers()?, &body).await?;
        parse_generate_content(response, &resolved.model)
    }
}

/// Map a `generateContent` body onto a `GenerationResponse`.
pub(crate) fn parse_generate_content(body: Value, model: &str) -> Result<GenerationResponse> {
    let response: GenerateContentResponse = serde_json::from_value(body.clone())
        .map_err(|e| LlmError::ParseError(format!("Unexpected Gemini response: {e}")))?;

    let Some(candidate) = response.candidates.first() else {
        let reason = response
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .unwrap_or_else(|| "no candidates returned".to_string());
        return Err(LlmError::GenerationError {
            provider: ProviderType::Gemini,
            message: format!("prompt blocked: {reason}"),
            status: None,
            details: Some(body),
        });
    };

    let text: String = candidate
        .content
        .as_ref()
        .map(|c| c.parts.iter().filter_map(|p| p.text.as_deref()).collect())
        .unwrap_or_default();

    let mut metadata = Map::new();
    metadata.insert("finish_reason".into(), json!(candidate.finish_reason));
    metadata.insert("safety_ratings".into(), json!(candidate.safety_ratings));

    Ok(GenerationResponse::new(text, ProviderType::Gemini, model)
        .with_usage(response.usage_metadata)
        .with_metadata(Some(metadata)))
}

#[async_trait]
impl LlmProvider for GeminiClient {
    fn provider_type(&self) -> ProviderType {
        ProviderType::Gemini
    }

    fn supported_models(&self) -> Vec<String> {
        GEMINI_MODELS.iter().map(|m| m.to_string()).collect()
    }

    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<GenerationResponse> {
        self.generate_content(vec![Content::text("user", prompt)], params)
            .await
    }

    async fn chat(
        &self,
        messages: &[ChatMessage],
        params: &GenerationParams,
    ) -> Result<GenerationResponse> {
        let contents = build_contents(messages);
        if contents.is_empty() {
            return Err(LlmError::InvalidInput(
                "chat requires at least one message".into(),
            ));
        }
        self.generate_content(contents, params).await
    }

    async fn health_check(&self) -> bool {
        let headers = match self.headers() {
            Ok(h) => h,
            Err(_) => return false,
        };
        let url = join_url(&self.config.base_url, "models");
        match self.transport.get_json(&url, headers).await {
            Ok(body) => serde_json::from_value::<ListModelsResponse>(body)
                .map(|list| !list.models.is_empty())
                .unwrap_or(false),
            Err(e) => {
                tracing::debug!(error = %e, "Gemini health check failed");
                false
            }
        }
    }
}
