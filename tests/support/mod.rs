//! Shared test doubles.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use genai_client::{
    ChatMessage, GenerationParams, GenerationResponse, LlmError, LlmProvider, ProviderType,
    Result,
};

/// How the mock answers a health check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Health {
    Up,
    Down,
    Panic,
}

/// Provider that echoes prompts and records concurrency.
pub struct MockProvider {
    provider_type: ProviderType,
    health: Health,
    failing: HashSet<String>,
    delay: Duration,
    pub calls: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub peak_in_flight: AtomicUsize,
}

impl MockProvider {
    pub fn new(provider_type: ProviderType) -> Self {
        Self {
            provider_type,
            health: Health::Up,
            failing: HashSet::new(),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn with_health(mut self, health: Health) -> Self {
        self.health = health;
        self
    }

    /// Prompts that fail with a `GenerationError`.
    pub fn failing_on(mut self, prompt: &str) -> Self {
        self.failing.insert(prompt.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn peak(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn provider_type(&self) -> ProviderType {
        self.provider_type
    }

    fn supported_models(&self) -> Vec<String> {
        vec!["mock-small".to_string(), "mock-large".to_string()]
    }

    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<GenerationResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        // Longer prompts finish earlier so completion order differs from input order.
        let jitter = Duration::from_millis(20u64.saturating_sub(prompt.len() as u64 * 2));
        tokio::time::sleep(self.delay + jitter).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(prompt) {
            return Err(LlmError::generation(
                self.provider_type,
                format!("mock failure for {prompt}"),
            ));
        }
        let model = params.model.clone().unwrap_or_else(|| "mock-small".into());
        Ok(GenerationResponse::new(
            prompt.to_uppercase(),
            self.provider_type,
            model,
        ))
    }

    async fn chat(
        &self,
        messages: &[ChatMessage],
        params: &GenerationParams,
    ) -> Result<GenerationResponse> {
        let last = messages
            .last()
            .ok_or_else(|| LlmError::InvalidInput("no messages".into()))?;
        self.generate(&last.content, params).await
    }

    async fn health_check(&self) -> bool {
        match self.health {
            Health::Up => true,
            Health::Down => false,
            Health::Panic => panic!("health check exploded"),
        }
    }
}
