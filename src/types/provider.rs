//! Provider identifiers

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LlmError;

/// Supported vendor backends. Used as the registry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    OpenAi,
    Bedrock,
    Gemini,
}

impl ProviderType {
    /// Every provider, in registry order.
    pub const ALL: [ProviderType; 3] = [Self::OpenAi, Self::Bedrock, Self::Gemini];

    /// Stable lowercase identifier.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Bedrock => "bedrock",
            Self::Gemini => "gemini",
        }
    }
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ProviderType {
    type Err = LlmError;

    /// Unknown ids are reported the same way as unconfigured ones.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "bedrock" => Ok(Self::Bedrock),
            "gemini" => Ok(Self::Gemini),
            _ => Err(LlmError::ProviderUnavailable(s.to_string())),
        }
    }
}
