use secrecy::SecretString;

use crate::config::Settings;
use crate::error::{LlmError, Result};
use crate::params::SamplingDefaults;

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-pro";

/// Gemini-specific configuration parameters
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key for authentication
    pub api_key: SecretString,
    /// Base URL for the Gemini API
    pub base_url: String,
    /// Model used when a call does not name one
    pub default_model: String,
    /// Fallback sampling parameters
    pub sampling: SamplingDefaults,
}

impl GeminiConfig {
    /// Create a new Gemini configuration with the given API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            base_url: GEMINI_BASE_URL.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            sampling: SamplingDefaults::default(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let api_key = settings
            .gemini_api_key
            .clone()
            .ok_or_else(|| LlmError::ConfigurationError("Gemini API key is required".into()))?;
        Ok(Self {
            api_key,
            base_url: settings
                .gemini_base_url
                .clone()
                .unwrap_or_else(|| GEMINI_BASE_URL.to_string()),
            default_model: DEFAULT_MODEL.to_string(),
            sampling: settings.sampling,
        })
    }

    /// Set the model to use
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Set the base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_sampling(mut self, sampling: SamplingDefaults) -> Self {
        self.sampling = sampling;
        self
    }
}
