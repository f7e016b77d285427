//! Google Gemini provider (`generateContent` REST API)

pub mod client;
pub mod convert;
pub mod types;

pub use client::{GEMINI_MODELS, GeminiClient};
pub use types::{DEFAULT_MODEL, GEMINI_BASE_URL, GeminiConfig};
