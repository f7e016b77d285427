//! Vendor backends
//!
//! One module per vendor, each exposing a config type and a client that
//! implements [`crate::provider::LlmProvider`].

pub mod bedrock;
pub mod gemini;
pub mod openai;

pub use bedrock::{BedrockClient, BedrockConfig};
pub use gemini::{GeminiClient, GeminiConfig};
pub use openai::{OpenAiClient, OpenAiConfig};
