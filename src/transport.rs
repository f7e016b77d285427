//! Thin JSON-over-HTTP layer shared by the vendor providers.
//!
//! Each provider owns one [`HttpTransport`]. Non-2xx answers become
//! [`LlmError::GenerationError`] with the vendor's own message pulled out of
//! the body; bodies that are not JSON are kept whole.

use std::time::Duration;

use reqwest::header::HeaderMap;
use serde_json::Value;

use crate::error::{LlmError, Result};
use crate::types::ProviderType;

/// Build the shared `reqwest::Client` used by every provider.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| LlmError::ConfigurationError(format!("Failed to build HTTP client: {e}")))
}

/// Join a base URL and a path without doubling or dropping the slash.
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// HTTP client bound to one provider.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    provider: ProviderType,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(provider: ProviderType, client: reqwest::Client) -> Self {
        Self { provider, client }
    }

    /// POST a JSON body and decode the JSON answer.
    pub async fn post_json(&self, url: &str, headers: HeaderMap, body: &Value) -> Result<Value> {
        tracing::debug!(provider = %self.provider, %url, "POST");
        let response = self
            .client
            .post(url)
            .headers(headers)
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        self.read_json(response).await
    }

    /// GET and decode the JSON answer.
    pub async fn get_json(&self, url: &str, headers: HeaderMap) -> Result<Value> {
        tracing::debug!(provider = %self.provider, %url, "GET");
        let response = self
            .client
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        self.read_json(response).await
    }

    async fn read_json(&self, response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            return Err(classify_error(self.provider, status.as_u16(), &text));
        }

        serde_json::from_str(&text).map_err(|e| {
            LlmError::ParseError(format!(
                "{} returned a non-JSON body: {e}",
                self.provider
            ))
        })
    }

    fn transport_error(&self, err: reqwest::Error) -> LlmError {
        LlmError::GenerationError {
            provider: self.provider,
            message: err.to_string(),
            status: err.status().map(|s| s.as_u16()),
            details: None,
        }
    }
}

/// Turn an error response into a `GenerationError`, keeping the vendor text.
pub fn classify_error(provider: ProviderType, status: u16, body_text: &str) -> LlmError {
    let details = serde_json::from_str::<Value>(body_text).ok();
    let message = details
        .as_ref()
        .and_then(extract_message)
        .unwrap_or_else(|| {
            let trimmed = body_text.trim();
            if trimmed.is_empty() {
                format!("HTTP {status}")
            } else {
                trimmed.to_string()
            }
        });

    LlmError::GenerationError {
        provider,
        message,
        status: Some(status),
        details,
    }
}

/// Vendors disagree on where the message lives:
/// OpenAI and Gemini use `{"error": {"message"}}`, Bedrock `{"message"}` or `{"Message"}`.
fn extract_message(json: &Value) -> Option<String> {
    json.get("error")
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
        .or_else(|| json.get("message").and_then(Value::as_str))
        .or_else(|| json.get("Message").and_then(Value::as_str))
        .or_else(|| json.get("error").and_then(Value::as_str))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("https://a/v1/", "/models"), "https://a/v1/models");
        assert_eq!(join_url("https://a/v1", "models"), "https://a/v1/models");
    }

    #[test]
    fn test_openai_style_error_message() {
        let body = r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error"}}"#;
        match classify_error(ProviderType::OpenAi, 401, body) {
            LlmError::GenerationError {
                message,
                status,
                details,
                ..
            } => {
                assert_eq!(message, "Incorrect API key provided");
                assert_eq!(status, Some(401));
                assert!(details.is_some());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_bedrock_style_error_message() {
        let body = r#"{"message":"The security token included in the request is invalid."}"#;
        let err = classify_error(ProviderType::Bedrock, 403, body);
        assert_eq!(
            err.to_string(),
            "bedrock generation failed: The security token included in the request is invalid."
        );
    }

    #[test]
    fn test_plain_text_body_is_kept_whole() {
        let err = classify_error(ProviderType::Gemini, 502, "upstream connect error");
        assert!(err.to_string().ends_with("upstream connect error"));
    }

    #[test]
    fn test_empty_body_falls_back_to_status() {
        let err = classify_error(ProviderType::Gemini, 503, "");
        assert!(err.to_string().ends_with("HTTP 503"));
    }
}
