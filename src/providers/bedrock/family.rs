//! Bedrock model families.
//!
//! Each family on Bedrock has its own `InvokeModel` body shape. The family is
//! picked from the model id prefix; a cross-region inference profile prefix
//! (`us.`, `eu.`, `apac.`, `global.`) is skipped first. Unknown prefixes are
//! rejected instead of guessing an encoding.

use serde_json::{Map, Value, json};

use crate::error::{LlmError, Result};
use crate::params::ResolvedParams;
use crate::types::{ChatMessage, GenerationResponse, MessageRole, ProviderType};

const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";
const INFERENCE_PROFILE_PREFIXES: &[&str] = &["us.", "eu.", "apac.", "global."];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFamily {
    /// `anthropic.claude*`: Anthropic messages API
    Claude,
    /// `amazon.titan*`: Titan text generation
    Titan,
    /// `ai21.j2*`: AI21 Jurassic-2
    Jurassic,
}

impl ModelFamily {
    pub fn detect(model_id: &str) -> Result<Self> {
        let base = INFERENCE_PROFILE_PREFIXES
            .iter()
            .find_map(|p| model_id.strip_prefix(p))
            .unwrap_or(model_id);

        if base.starts_with("anthropic.claude") {
            Ok(Self::Claude)
        } else if base.starts_with("amazon.titan") {
            Ok(Self::Titan)
        } else if base.starts_with("ai21.j2") {
            Ok(Self::Jurassic)
        } else {
            Err(LlmError::UnsupportedModel {
                provider: ProviderType::Bedrock,
                model: model_id.to_string(),
            })
        }
    }

    /// Body for a single-turn prompt.
    pub fn prompt_body(self, prompt: &str, params: &ResolvedParams) -> Value {
        match self {
            Self::Claude => json!({
                "anthropic_version": ANTHROPIC_VERSION,
                "max_tokens": params.max_tokens,
                "temperature": params.temperature,
                "top_p": params.top_p,
                "messages": [{ "role": "user", "content": prompt }],
            }),
            Self::Titan => json!({
                "inputText": prompt,
                "textGenerationConfig": {
                    "maxTokenCount": params.max_tokens,
                    "temperature": params.temperature,
                    "topP": params.top_p,
                },
            }),
            Self::Jurassic => json!({
                "prompt": prompt,
                "maxTokens": params.max_tokens,
                "temperature": params.temperature,
                "topP": params.top_p,
            }),
        }
    }

    /// Body for a conversation.
    ///
    /// Claude gets native turns with system text lifted into `system`. The
    /// other families only take a prompt, so the transcript is flattened into
    /// `role: content` lines with system lines kept in place.
    pub fn chat_body(self, messages: &[ChatMessage], params: &ResolvedParams) -> Result<Value> {
        match self {
            Self::Claude => {
                let system: Vec<&str> = messages
                    .iter()
                    .filter(|m| m.role == MessageRole::System)
                    .map(|m| m.content.as_str())
                    .collect();
                let turns: Vec<Value> = messages
                    .iter()
                    .filter(|m| m.role != MessageRole::System)
                    .map(|m| json!({ "role": m.role.as_str(), "content": m.content }))
                    .collect();
                if turns.is_empty() {
                    return Err(LlmError::InvalidInput(
                        "Claude chat requires at least one user or assistant message".into(),
                    ));
                }

                let mut body = json!({
                    "anthropic_version": ANTHROPIC_VERSION,
                    "max_tokens": params.max_tokens,
                    "temperature": params.temperature,
                    "top_p": params.top_p,
                    "messages": turns,
                });
                if !system.is_empty() {
                    body["system"] = Value::String(system.join("\n\n"));
                }
                Ok(body)
            }
            Self::Titan | Self::Jurassic => {
                if messages.is_empty() {
                    return Err(LlmError::InvalidInput(
                        "chat requires at least one message".into(),
                    ));
                }
                let prompt = messages
                    .iter()
                    .map(|m| format!("{}: {}", m.role, m.content))
                    .collect::<Vec<_>>()
                    .join("\n");
                Ok(self.prompt_body(&prompt, params))
            }
        }
    }

    /// Decode an `InvokeModel` answer.
    pub fn parse_response(self, body: &Value, model: &str) -> Result<GenerationResponse> {
        match self {
            Self::Claude => {
                let text = body
                    .pointer("/content/0/text")
                    .and_then(Value::as_str)
                    .ok_or_else(|| missing("content[0].text"))?;
                let usage = body.get("usage").and_then(Value::as_object).cloned();
                let mut metadata = Map::new();
                metadata.insert("stop_reason".into(), field(body, "stop_reason"));
                metadata.insert("model_id".into(), field(body, "model"));
                Ok(GenerationResponse::new(text, ProviderType::Bedrock, model)
                    .with_usage(usage)
                    .with_metadata(Some(metadata)))
            }
            Self::Titan => {
                let result = body
                    .pointer("/results/0")
                    .ok_or_else(|| missing("results[0]"))?;
                let text = result
                    .get("outputText")
                    .and_then(Value::as_str)
                    .ok_or_else(|| missing("results[0].outputText"))?;
                let mut usage = Map::new();
                usage.insert("input_tokens".into(), field(body, "inputTextTokenCount"));
                usage.insert("output_tokens".into(), field(result, "tokenCount"));
                let mut metadata = Map::new();
                metadata.insert("completion_reason".into(), field(result, "completionReason"));
                Ok(GenerationResponse::new(text, ProviderType::Bedrock, model)
                    .with_usage(Some(usage))
                    .with_metadata(Some(metadata)))
            }
            Self::Jurassic => {
                let text = body
                    .pointer("/completions/0/data/text")
                    .and_then(Value::as_str)
                    .ok_or_else(|| missing("completions[0].data.text"))?;
                let mut usage = Map::new();
                usage.insert(
                    "prompt_tokens".into(),
                    token_count(body.pointer("/prompt/tokens")),
                );
                usage.insert(
                    "completion_tokens".into(),
                    token_count(body.pointer("/completions/0/data/tokens")),
                );
                Ok(GenerationResponse::new(text, ProviderType::Bedrock, model)
                    .with_usage(Some(usage)))
            }
        }
    }
}

fn field(value: &Value, key: &str) -> Value {
    value.get(key).cloned().unwrap_or(Value::Null)
}

/// Jurassic reports tokens as arrays of token objects.
fn token_count(tokens: Option<&Value>) -> Value {
    tokens
        .and_then(Value::as_array)
        .map(|t| json!(t.len()))
        .unwrap_or(Value::Null)
}

fn missing(path: &str) -> LlmError {
    LlmError::ParseError(format!("Bedrock response is missing {path}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> ResolvedParams {
        ResolvedParams {
            model: "m".into(),
            max_tokens: 100,
            temperature: 0.5,
            top_p: 0.9,
        }
    }

    #[test]
    fn test_detect_families() {
        assert_eq!(
            ModelFamily::detect("anthropic.claude-3-haiku-20240307-v1:0").unwrap(),
            ModelFamily::Claude
        );
        assert_eq!(
            ModelFamily::detect("us.anthropic.claude-3-5-sonnet-20240620-v1:0").unwrap(),
            ModelFamily::Claude
        );
        assert_eq!(
            ModelFamily::detect("amazon.titan-text-express-v1").unwrap(),
            ModelFamily::Titan
        );
        assert_eq!(
            ModelFamily::detect("ai21.j2-ultra-v1").unwrap(),
            ModelFamily::Jurassic
        );
    }

    #[test]
    fn test_unknown_family_is_unsupported() {
        let err = ModelFamily::detect("meta.llama3-8b-instruct-v1:0").unwrap_err();
        assert!(matches!(
            err,
            LlmError::UnsupportedModel { ref model, .. } if model == "meta.llama3-8b-instruct-v1:0"
        ));
        // Prefix match only; a family name elsewhere in the id does not count.
        assert!(ModelFamily::detect("custom/anthropic.claude").is_err());
    }

    #[test]
    fn test_titan_prompt_body_shape() {
        let body = ModelFamily::Titan.prompt_body("hi", &params());
        assert_eq!(body["inputText"], "hi");
        assert_eq!(body["textGenerationConfig"]["maxTokenCount"], 100);
        assert_eq!(body["textGenerationConfig"]["topP"], 0.9);
    }

    #[test]
    fn test_claude_chat_lifts_system_prompt() {
        let body = ModelFamily::Claude
            .chat_body(
                &[ChatMessage::system("Be brief."), ChatMessage::user("Hi")],
                &params(),
            )
            .unwrap();
        assert_eq!(body["system"], "Be brief.");
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert_eq!(body["messages"][0]["role"], "user");
    }

    #[test]
    fn test_jurassic_chat_flattens_transcript() {
        let body = ModelFamily::Jurassic
            .chat_body(
                &[ChatMessage::system("Be brief."), ChatMessage::user("Hi")],
                &params(),
            )
            .unwrap();
        assert_eq!(body["prompt"], "system: Be brief.\nuser: Hi");
    }

    #[test]
    fn test_parse_titan_response() {
        let body = json!({
            "inputTextTokenCount": 3,
            "results": [{"tokenCount": 7, "outputText": "Hello", "completionReason": "FINISH"}]
        });
        let resp = ModelFamily::Titan
            .parse_response(&body, "amazon.titan-text-lite-v1")
            .unwrap();
        assert_eq!(resp.text, "Hello");
        assert_eq!(resp.usage_u64("input_tokens"), Some(3));
        assert_eq!(resp.usage_u64("output_tokens"), Some(7));
        assert_eq!(resp.metadata.unwrap()["completion_reason"], "FINISH");
    }

    #[test]
    fn test_parse_jurassic_counts_tokens() {
        let body = json!({
            "prompt": {"tokens": [{}, {}]},
            "completions": [{"data": {"text": "Yo", "tokens": [{}, {}, {}]}}]
        });
        let resp = ModelFamily::Jurassic
            .parse_response(&body, "ai21.j2-mid-v1")
            .unwrap();
        assert_eq!(resp.text, "Yo");
        assert_eq!(resp.usage_u64("prompt_tokens"), Some(2));
        assert_eq!(resp.usage_u64("completion_tokens"), Some(3));
        assert!(resp.metadata.is_none());
    }

    #[test]
    fn test_parse_claude_missing_content_is_parse_error() {
        let err = ModelFamily::Claude
            .parse_response(&json!({"content": []}), "anthropic.claude-v2:1")
            .unwrap_err();
        assert!(matches!(err, LlmError::ParseError(_)));
    }
}
