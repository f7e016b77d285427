//! `OpenAI` provider (Chat Completions API)

pub mod client;

pub use client::{DEFAULT_MODEL, OPENAI_BASE_URL, OPENAI_MODELS, OpenAiClient, OpenAiConfig};
