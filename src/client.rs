//! Unified client facade.
//!
//! [`GenAiClient`] owns the provider registry: a map from [`ProviderType`] to
//! a constructed backend. Construction from settings attempts every vendor and
//! leaves out the ones that fail, so a missing credential only makes that
//! provider unavailable. After construction the registry is never mutated.

use std::collections::{BTreeMap, HashMap};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::join_all;

use crate::batch::run_bounded;
use crate::config::Settings;
use crate::error::{LlmError, Result};
use crate::params::GenerationParams;
use crate::provider::LlmProvider;
use crate::providers::{
    BedrockClient, BedrockConfig, GeminiClient, GeminiConfig, OpenAiClient, OpenAiConfig,
};
use crate::transport::build_http_client;
use crate::types::{BatchOutcome, ChatMessage, GenerationResponse, ProviderInfo, ProviderType};

/// Default number of concurrent calls in a batch.
pub const DEFAULT_BATCH_CONCURRENCY: usize = 5;

/// Registry of constructed providers with a uniform call surface.
#[derive(Clone, Default)]
pub struct GenAiClient {
    providers: HashMap<ProviderType, Arc<dyn LlmProvider>>,
}

impl std::fmt::Debug for GenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenAiClient")
            .field("providers", &self.available_providers())
            .finish()
    }
}

impl GenAiClient {
    pub fn builder() -> GenAiClientBuilder {
        GenAiClientBuilder::default()
    }

    /// Build every provider the settings allow.
    ///
    /// Never fails: a provider whose construction fails is logged and left
    /// out. An HTTP client that cannot be built leaves the registry empty.
    pub fn from_settings(settings: &Settings) -> Self {
        let http_client = match build_http_client(settings.request_timeout) {
            Ok(client) => client,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to build HTTP client; no providers registered");
                return Self::default();
            }
        };

        let mut builder = Self::builder();
        for provider_type in ProviderType::ALL {
            match build_provider(provider_type, settings, &http_client) {
                Ok(provider) => {
                    tracing::info!(provider = %provider_type, "Provider initialized");
                    builder = builder.with_provider(provider);
                }
                Err(e) => {
                    tracing::warn!(provider = %provider_type, error = %e, "Failed to initialize provider");
                }
            }
        }
        builder.build()
    }

    /// Look up a registered provider.
    pub fn provider(&self, provider_type: ProviderType) -> Result<&Arc<dyn LlmProvider>> {
        self.providers
            .get(&provider_type)
            .ok_or_else(|| LlmError::ProviderUnavailable(provider_type.to_string()))
    }

    /// Parse a textual provider id and look it up.
    pub fn resolve_provider(&self, id: &str) -> Result<ProviderType> {
        let provider_type: ProviderType = id.parse()?;
        self.provider(provider_type)?;
        Ok(provider_type)
    }

    pub async fn generate(
        &self,
        provider_type: ProviderType,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<GenerationResponse> {
        let provider = self.provider(provider_type)?;
        tracing::debug!(
            provider = %provider_type,
            model = params.model.as_deref().unwrap_or("default"),
            prompt_len = prompt.len(),
            "generate"
        );
        provider.generate(prompt, params).await
    }

    pub async fn chat(
        &self,
        provider_type: ProviderType,
        messages: &[ChatMessage],
        params: &GenerationParams,
    ) -> Result<GenerationResponse> {
        let provider = self.provider(provider_type)?;
        tracing::debug!(provider = %provider_type, messages = messages.len(), "chat");
        provider.chat(messages, params).await
    }

    pub fn available_models(&self, provider_type: ProviderType) -> Result<Vec<String>> {
        Ok(self.provider(provider_type)?.supported_models())
    }

    /// Generate for every prompt with at most `concurrency` calls in flight.
    ///
    /// The outcome is index-aligned with `prompts`. A failing prompt yields
    /// an `Err` in its own slot and never aborts the others. `concurrency`
    /// below 1 is treated as 1.
    pub async fn batch_generate(
        &self,
        provider_type: ProviderType,
        prompts: &[String],
        params: &GenerationParams,
        concurrency: usize,
    ) -> BatchOutcome {
        self.batch_generate_with_progress(provider_type, prompts, params, concurrency, |_, _| {})
            .await
    }

    /// [`batch_generate`](Self::batch_generate) that calls `on_unit` with the
    /// prompt index and result as each prompt completes, in completion order.
    pub async fn batch_generate_with_progress<P>(
        &self,
        provider_type: ProviderType,
        prompts: &[String],
        params: &GenerationParams,
        concurrency: usize,
        on_unit: P,
    ) -> BatchOutcome
    where
        P: Fn(usize, &Result<GenerationResponse>),
    {
        tracing::info!(
            provider = %provider_type,
            prompts = prompts.len(),
            concurrency,
            "Starting batch"
        );
        let on_unit = &on_unit;
        let outcome = run_bounded(prompts.iter().enumerate(), concurrency, |(index, prompt)| {
            async move {
                let result = self.generate(provider_type, prompt, params).await;
                on_unit(index, &result);
                result
            }
        })
        .await;
        let failures = outcome.iter().filter(|r| r.is_err()).count();
        tracing::info!(
            provider = %provider_type,
            successes = outcome.len() - failures,
            failures,
            "Batch finished"
        );
        outcome
    }

    /// Poll every registered provider concurrently.
    ///
    /// A provider that reports false or panics is `false` in the map; the
    /// others are unaffected.
    pub async fn health_check_all(&self) -> BTreeMap<ProviderType, bool> {
        let checks = self.providers.iter().map(|(provider_type, provider)| {
            let provider = Arc::clone(provider);
            let provider_type = *provider_type;
            async move {
                let healthy = AssertUnwindSafe(provider.health_check())
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|_| {
                        tracing::error!(provider = %provider_type, "Health check panicked");
                        false
                    });
                (provider_type, healthy)
            }
        });
        join_all(checks).await.into_iter().collect()
    }

    /// Registered provider ids, sorted.
    pub fn available_providers(&self) -> Vec<ProviderType> {
        let mut ids: Vec<ProviderType> = self.providers.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn provider_info(&self) -> BTreeMap<ProviderType, ProviderInfo> {
        self.providers
            .iter()
            .map(|(provider_type, provider)| {
                (
                    *provider_type,
                    ProviderInfo {
                        available: true,
                        models: provider.supported_models(),
                        provider_name: provider.provider_name().to_string(),
                    },
                )
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

fn build_provider(
    provider_type: ProviderType,
    settings: &Settings,
    http_client: &reqwest::Client,
) -> Result<Arc<dyn LlmProvider>> {
    let provider: Arc<dyn LlmProvider> = match provider_type {
        ProviderType::OpenAi => Arc::new(OpenAiClient::new(
            OpenAiConfig::from_settings(settings)?,
            http_client.clone(),
        )),
        ProviderType::Bedrock => Arc::new(BedrockClient::new(
            BedrockConfig::from_settings(settings)?,
            http_client.clone(),
        )),
        ProviderType::Gemini => Arc::new(GeminiClient::new(
            GeminiConfig::from_settings(settings)?,
            http_client.clone(),
        )),
    };
    Ok(provider)
}

/// Explicit registry construction.
#[derive(Default)]
pub struct GenAiClientBuilder {
    providers: HashMap<ProviderType, Arc<dyn LlmProvider>>,
}

impl GenAiClientBuilder {
    /// Register a provider under its own `provider_type()`; a later
    /// registration for the same id replaces the earlier one.
    pub fn with_provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.providers.insert(provider.provider_type(), provider);
        self
    }

    pub fn build(self) -> GenAiClient {
        GenAiClient {
            providers: self.providers,
        }
    }
}
