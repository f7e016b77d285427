//! The provider capability every vendor backend implements.
//!
//! A provider normalizes only the outer shape of a result (text, provider,
//! model, usage, metadata). Vendor usage and metadata keys pass through
//! unchanged.

use async_trait::async_trait;

use crate::error::Result;
use crate::params::GenerationParams;
use crate::types::{ChatMessage, GenerationResponse, ProviderType};

#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Registry key of this provider.
    fn provider_type(&self) -> ProviderType;

    /// Stable lowercase name, equal to the registry key.
    fn provider_name(&self) -> &'static str {
        self.provider_type().as_str()
    }

    /// Static model catalog; no network call.
    fn supported_models(&self) -> Vec<String>;

    /// Single-turn completion.
    async fn generate(&self, prompt: &str, params: &GenerationParams)
    -> Result<GenerationResponse>;

    /// Multi-turn completion.
    ///
    /// Backends without a native system role fold system messages into the
    /// first user turn rather than dropping them.
    async fn chat(
        &self,
        messages: &[ChatMessage],
        params: &GenerationParams,
    ) -> Result<GenerationResponse>;

    /// Cheapest call that proves the vendor is reachable. Never errors.
    async fn health_check(&self) -> bool;
}
