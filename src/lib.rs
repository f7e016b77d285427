//! # genai-client
//!
//! One client for `OpenAI`, Amazon Bedrock and Google Gemini.
//!
//! [`GenAiClient`] builds every provider the configuration allows and exposes
//! generate, chat, bounded-concurrency batch generation and health checks
//! behind a single call surface. A REST API (`server` feature) and the
//! `genai` command-line tool (`cli` feature) sit on top of it.
//!
//! ```rust,ignore
//! use genai_client::prelude::*;
//!
//! let settings = Settings::from_env()?;
//! let client = GenAiClient::from_settings(&settings);
//! let response = client
//!     .generate(ProviderType::OpenAi, "Explain quantum computing", &GenerationParams::new())
//!     .await?;
//! println!("{}", response.text);
//! ```

pub mod batch;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod params;
pub mod provider;
pub mod providers;
pub mod transport;
pub mod types;

#[cfg(feature = "cli")]
pub mod cli;
#[cfg(feature = "server")]
pub mod server;

pub use batch::{BatchError, BatchReport, run_bounded};
pub use client::{DEFAULT_BATCH_CONCURRENCY, GenAiClient, GenAiClientBuilder};
pub use config::Settings;
pub use error::{LlmError, Result};
pub use params::{GenerationParams, SamplingDefaults};
pub use provider::LlmProvider;
pub use types::{
    BatchOutcome, ChatMessage, GenerationResponse, MessageRole, ProviderInfo, ProviderType,
};

pub mod prelude {
    pub use crate::batch::{BatchReport, run_bounded};
    pub use crate::client::GenAiClient;
    pub use crate::config::Settings;
    pub use crate::error::{LlmError, Result};
    pub use crate::params::GenerationParams;
    pub use crate::provider::LlmProvider;
    pub use crate::types::{ChatMessage, GenerationResponse, MessageRole, ProviderType};
}
