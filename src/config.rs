//! Process configuration.
//!
//! Settings come from environment variables, after an optional `.env` file in
//! the working directory has been loaded. Every field has a default except the
//! vendor credentials; a provider whose credential is missing is left out of
//! the registry rather than failing startup.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::{LlmError, Result};
use crate::logging::{LogConfig, OutputFormat};
use crate::params::SamplingDefaults;

pub const DEFAULT_AWS_REGION: &str = "us-east-1";
pub const DEFAULT_API_HOST: &str = "0.0.0.0";
pub const DEFAULT_API_PORT: u16 = 8000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Application settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub openai_api_key: Option<SecretString>,
    pub openai_base_url: Option<String>,
    pub gemini_api_key: Option<SecretString>,
    pub gemini_base_url: Option<String>,
    pub aws_region: String,
    pub bedrock_api_key: Option<SecretString>,
    pub bedrock_runtime_url: Option<String>,
    pub bedrock_control_url: Option<String>,
    pub sampling: SamplingDefaults,
    pub request_timeout: Duration,
    pub api_host: String,
    pub api_port: u16,
    pub log: LogConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_base_url: None,
            gemini_api_key: None,
            gemini_base_url: None,
            aws_region: DEFAULT_AWS_REGION.to_string(),
            bedrock_api_key: None,
            bedrock_runtime_url: None,
            bedrock_control_url: None,
            sampling: SamplingDefaults::default(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            api_host: DEFAULT_API_HOST.to_string(),
            api_port: DEFAULT_API_PORT,
            log: LogConfig::default(),
        }
    }
}

impl Settings {
    /// Load `.env` (if present) and read the process environment.
    pub fn from_env() -> Result<Self> {
        // A missing .env file is the normal case.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup.
    ///
    /// Blank values count as unset. Numbers that fail to parse are a
    /// `ConfigurationError` naming the variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let secret = |key: &str| get(key).map(SecretString::from);
        let defaults = Self::default();

        let sampling = SamplingDefaults {
            max_tokens: parse_or(&get, "MAX_TOKENS", defaults.sampling.max_tokens)?,
            temperature: parse_or(&get, "TEMPERATURE", defaults.sampling.temperature)?,
            top_p: parse_or(&get, "TOP_P", defaults.sampling.top_p)?,
        };

        let log = LogConfig {
            level: get("LOG_LEVEL").unwrap_or(defaults.log.level),
            format: match get("LOG_FORMAT") {
                Some(raw) => raw.parse::<OutputFormat>()?,
                None => defaults.log.format,
            },
            file: get("LOG_FILE").map(Into::into),
        };

        Ok(Self {
            openai_api_key: secret("OPENAI_API_KEY"),
            openai_base_url: get("OPENAI_BASE_URL"),
            gemini_api_key: secret("GEMINI_API_KEY"),
            gemini_base_url: get("GEMINI_BASE_URL"),
            aws_region: get("AWS_REGION").unwrap_or(defaults.aws_region),
            bedrock_api_key: secret("AWS_BEARER_TOKEN_BEDROCK"),
            bedrock_runtime_url: get("BEDROCK_RUNTIME_URL"),
            bedrock_control_url: get("BEDROCK_CONTROL_URL"),
            sampling,
            request_timeout: Duration::from_secs(parse_or(
                &get,
                "REQUEST_TIMEOUT_SECS",
                DEFAULT_TIMEOUT_SECS,
            )?),
            api_host: get("API_HOST").unwrap_or(defaults.api_host),
            api_port: parse_or(&get, "API_PORT", defaults.api_port)?,
            log,
        })
    }

    /// `host:port` the REST API binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw.trim().parse::<T>().map_err(|e| {
            LlmError::ConfigurationError(format!("{key}={raw:?} is not valid: {e}"))
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();
        assert!(settings.openai_api_key.is_none());
        assert!(settings.gemini_api_key.is_none());
        assert_eq!(settings.aws_region, "us-east-1");
        assert_eq!(settings.sampling, SamplingDefaults::default());
        assert_eq!(settings.bind_address(), "0.0.0.0:8000");
        assert_eq!(settings.request_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_reads_credentials_and_overrides() {
        let settings = Settings::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("AWS_REGION", "eu-west-1"),
            ("TEMPERATURE", "0"),
            ("MAX_TOKENS", "256"),
            ("API_PORT", "9000"),
            ("LOG_FORMAT", "json"),
        ]))
        .unwrap();
        assert_eq!(
            settings.openai_api_key.as_ref().unwrap().expose_secret(),
            "sk-test"
        );
        assert_eq!(settings.aws_region, "eu-west-1");
        assert_eq!(settings.sampling.temperature, 0.0);
        assert_eq!(settings.sampling.max_tokens, 256);
        assert_eq!(settings.api_port, 9000);
        assert_eq!(settings.log.format, OutputFormat::Json);
    }

    #[test]
    fn test_blank_key_counts_as_missing() {
        let settings = Settings::from_lookup(lookup(&[("GEMINI_API_KEY", "   ")])).unwrap();
        assert!(settings.gemini_api_key.is_none());
    }

    #[test]
    fn test_malformed_number_is_a_configuration_error() {
        let err = Settings::from_lookup(lookup(&[("TOP_P", "high")])).unwrap_err();
        match err {
            LlmError::ConfigurationError(msg) => assert!(msg.contains("TOP_P")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
