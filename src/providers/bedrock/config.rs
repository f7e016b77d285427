use secrecy::SecretString;

use crate::config::{DEFAULT_AWS_REGION, Settings};
use crate::error::{LlmError, Result};
use crate::params::SamplingDefaults;

pub const DEFAULT_MODEL: &str = "anthropic.claude-3-sonnet-20240229-v1:0";

/// Amazon Bedrock configuration
///
/// Authenticates with a Bedrock API key sent as a bearer token.
#[derive(Debug, Clone)]
pub struct BedrockConfig {
    pub api_key: SecretString,
    pub region: String,
    /// `bedrock-runtime` endpoint used for `InvokeModel`
    pub runtime_url: String,
    /// `bedrock` control-plane endpoint used for the health check
    pub control_url: String,
    pub default_model: String,
    pub sampling: SamplingDefaults,
}

impl BedrockConfig {
    pub fn new(api_key: impl Into<String>, region: impl Into<String>) -> Self {
        let region = region.into();
        Self {
            api_key: SecretString::from(api_key.into()),
            runtime_url: runtime_url_for(&region),
            control_url: control_url_for(&region),
            region,
            default_model: DEFAULT_MODEL.to_string(),
            sampling: SamplingDefaults::default(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let api_key = settings.bedrock_api_key.clone().ok_or_else(|| {
            LlmError::ConfigurationError(
                "Bedrock API key is required (AWS_BEARER_TOKEN_BEDROCK)".into(),
            )
        })?;
        let region = if settings.aws_region.trim().is_empty() {
            DEFAULT_AWS_REGION.to_string()
        } else {
            settings.aws_region.clone()
        };
        Ok(Self {
            api_key,
            runtime_url: settings
                .bedrock_runtime_url
                .clone()
                .unwrap_or_else(|| runtime_url_for(&region)),
            control_url: settings
                .bedrock_control_url
                .clone()
                .unwrap_or_else(|| control_url_for(&region)),
            region,
            default_model: DEFAULT_MODEL.to_string(),
            sampling: settings.sampling,
        })
    }

    /// Point both endpoints at one base URL (mock servers, VPC endpoints).
    pub fn with_endpoint(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.runtime_url = url.clone();
        self.control_url = url;
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

fn runtime_url_for(region: &str) -> String {
    format!("https://bedrock-runtime.{region}.amazonaws.com")
}

fn control_url_for(region: &str) -> String {
    format!("https://bedrock.{region}.amazonaws.com")
}
