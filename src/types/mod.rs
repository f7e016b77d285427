//! Core data types shared by providers, the facade and the transports.

pub mod chat;
pub mod provider;
pub mod response;

pub use chat::{ChatMessage, MessageRole};
pub use provider::ProviderType;
pub use response::{GenerationResponse, ProviderInfo};

/// Per-prompt results of a batch, index-aligned with the input prompts.
pub type BatchOutcome = Vec<crate::error::Result<GenerationResponse>>;
