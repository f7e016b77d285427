//! Generation results

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ProviderType;

/// Outcome of a single generate or chat call.
///
/// `usage` and `metadata` keep the vendor's own keys. OpenAI reports
/// `prompt_tokens`, Gemini `promptTokenCount`, Claude on Bedrock
/// `input_tokens`; none of them are renamed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub text: String,
    pub provider: ProviderType,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl GenerationResponse {
    pub fn new(text: impl Into<String>, provider: ProviderType, model: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            provider,
            model: model.into(),
            usage: None,
            metadata: None,
        }
    }

    pub fn with_usage(mut self, usage: Option<Map<String, Value>>) -> Self {
        self.usage = usage;
        self
    }

    pub fn with_metadata(mut self, metadata: Option<Map<String, Value>>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Read a numeric usage field by its vendor key.
    pub fn usage_u64(&self, key: &str) -> Option<u64> {
        self.usage.as_ref()?.get(key)?.as_u64()
    }
}

/// Static description of a registered provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
    pub available: bool,
    pub models: Vec<String>,
    pub provider_name: String,
}
