//! Batch input and output files.

use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::batch::BatchReport;
use crate::error::Result;
use crate::types::{BatchOutcome, ProviderType};

/// Read one prompt per line, trimmed, skipping blank lines.
pub async fn read_prompts(path: &Path) -> Result<Vec<String>> {
    let text = tokio::fs::read_to_string(path).await?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchFileEntry {
    pub prompt_index: usize,
    pub prompt: String,
    pub response: String,
    pub provider: ProviderType,
    pub model: String,
    pub usage: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchFileError {
    pub prompt_index: usize,
    pub error: String,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct BatchSummary {
    pub total_prompts: usize,
    pub successful: usize,
    pub failed: usize,
}

/// JSON document written by `genai batch`.
#[derive(Debug, Clone, Serialize)]
pub struct BatchFile {
    pub results: Vec<BatchFileEntry>,
    pub errors: Vec<BatchFileError>,
    pub summary: BatchSummary,
}

impl BatchFile {
    pub fn from_outcome(prompts: &[String], outcome: BatchOutcome) -> Self {
        let report = BatchReport::from_outcome(prompts, &outcome);
        let results = outcome
            .into_iter()
            .enumerate()
            .filter_map(|(prompt_index, result)| {
                result.ok().map(|resp| BatchFileEntry {
                    prompt_index,
                    prompt: prompts.get(prompt_index).cloned().unwrap_or_default(),
                    response: resp.text,
                    provider: resp.provider,
                    model: resp.model,
                    usage: resp.usage,
                })
            })
            .collect();

        Self {
            results,
            summary: BatchSummary {
                total_prompts: report.total,
                successful: report.successes,
                failed: report.failures,
            },
            errors: report
                .errors
                .into_iter()
                .map(|e| BatchFileError {
                    prompt_index: e.index,
                    error: e.error,
                })
                .collect(),
        }
    }

    /// Write as pretty-printed JSON.
    pub async fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;
    use crate::types::GenerationResponse;

    #[tokio::test]
    async fn test_read_prompts_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prompts.txt");
        tokio::fs::write(&path, "first\n\n  second  \n   \nthird")
            .await
            .unwrap();

        let prompts = read_prompts(&path).await.unwrap();
        assert_eq!(prompts, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_missing_input_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_prompts(&dir.path().join("nope.txt")).await.unwrap_err();
        assert!(matches!(err, LlmError::IoError(_)));
    }

    #[tokio::test]
    async fn test_write_batch_file() {
        let prompts = vec!["a".to_string(), "b".to_string()];
        let outcome: BatchOutcome = vec![
            Err(LlmError::generation(ProviderType::Gemini, "quota exceeded")),
            Ok(GenerationResponse::new("B", ProviderType::Gemini, "gemini-pro")),
        ];
        let file = BatchFile::from_outcome(&prompts, outcome);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        file.write(&path).await.unwrap();

        let written: Value =
            serde_json::from_str(&tokio::fs::read_to_string(&path).await.unwrap()).unwrap();
        assert_eq!(written["summary"]["total_prompts"], 2);
        assert_eq!(written["summary"]["failed"], 1);
        assert_eq!(written["errors"][0]["prompt_index"], 0);
        assert!(
            written["errors"][0]["error"]
                .as_str()
                .unwrap()
                .contains("quota exceeded")
        );
        assert_eq!(written["results"][0]["prompt_index"], 1);
        assert_eq!(written["results"][0]["prompt"], "b");
        assert_eq!(written["results"][0]["provider"], "gemini");
    }
}
