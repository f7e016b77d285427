//! Amazon Bedrock provider

mod client;
mod config;
mod family;

pub use client::{BEDROCK_MODELS, BedrockClient};
pub use config::{BedrockConfig, DEFAULT_MODEL};
pub use family::ModelFamily;
