//! Error handling types for genai-client.
//!
//! Vendor messages are kept verbatim: a failed vendor call surfaces as
//! [`LlmError::GenerationError`] with the message the vendor returned, the
//! HTTP status when there was one, and the raw JSON body when it parsed.

use crate::types::ProviderType;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, LlmError>;

/// Unified error type
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// The requested provider is unknown or was not constructed.
    #[error("Provider {0} is not available")]
    ProviderUnavailable(String),

    /// The provider is known but the model family is not.
    #[error("Unsupported {provider} model: {model}")]
    UnsupportedModel { provider: ProviderType, model: String },

    /// A vendor call failed.
    #[error("{provider} generation failed: {message}")]
    GenerationError {
        provider: ProviderType,
        message: String,
        status: Option<u16>,
        details: Option<serde_json::Value>,
    },

    /// Missing or malformed configuration.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Caller supplied an invalid argument.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A vendor response did not have the expected shape.
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("JSON error: {0}")]
    JsonError(String),

    #[error("IO error: {0}")]
    IoError(String),
}

impl LlmError {
    /// Build a `GenerationError` from a bare vendor message.
    pub fn generation(provider: ProviderType, message: impl Into<String>) -> Self {
        Self::GenerationError {
            provider,
            message: message.into(),
            status: None,
            details: None,
        }
    }

    /// True when the error came from a registry lookup.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::ProviderUnavailable(_))
    }

    /// HTTP status the REST surface answers with for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::ProviderUnavailable(_) => 404,
            Self::UnsupportedModel { .. } | Self::InvalidInput(_) => 400,
            _ => 500,
        }
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        Self::HttpError(err.to_string())
    }
}

impl From<serde_json::Error> for LlmError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonError(err.to_string())
    }
}

impl From<std::io::Error> for LlmError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: LlmError = json_err.into();
        assert!(matches!(err, LlmError::JsonError(_)));
    }

    #[test]
    fn test_generation_error_keeps_vendor_message() {
        let err = LlmError::generation(ProviderType::OpenAi, "Incorrect API key provided");
        assert_eq!(
            err.to_string(),
            "openai generation failed: Incorrect API key provided"
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            LlmError::ProviderUnavailable("gemini".into()).status_code(),
            404
        );
        assert_eq!(
            LlmError::UnsupportedModel {
                provider: ProviderType::Bedrock,
                model: "meta.llama3".into(),
            }
            .status_code(),
            400
        );
        assert_eq!(LlmError::HttpError("x".into()).status_code(), 500);
        assert!(LlmError::ProviderUnavailable("x".into()).is_unavailable());
    }
}
