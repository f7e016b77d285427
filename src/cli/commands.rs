use std::borrow::Cow;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, bail};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::client::GenAiClient;
use crate::config::Settings;
use crate::params::GenerationParams;
use crate::types::{ChatMessage, ProviderType};

use super::batch_file::{BatchFile, read_prompts};

const SHOWN_MODELS: usize = 3;

fn spinner(message: impl Into<Cow<'static, str>>) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    if let Ok(template) = ProgressStyle::with_template("{spinner:.green} {msg}") {
        bar.set_style(template);
    }
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

fn progress_bar(len: usize) -> ProgressBar {
    let bar = ProgressBar::new(len as u64);
    if let Ok(template) =
        ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        bar.set_style(template.progress_chars("=> "));
    }
    bar
}

pub async fn generate(
    settings: &Settings,
    provider: ProviderType,
    prompt: &str,
    params: &GenerationParams,
    output: Option<std::path::PathBuf>,
) -> anyhow::Result<()> {
    let client = GenAiClient::from_settings(settings);
    let bar = spinner(format!("Generating with {provider}..."));
    let result = client.generate(provider, prompt, params).await;
    bar.finish_and_clear();
    let response = result?;

    println!(
        "\n{}",
        style(format!(
            "Generated Text ({}/{}):",
            response.provider, response.model
        ))
        .green()
        .bold()
    );
    println!("{}\n", response.text);

    if let Some(usage) = &response.usage {
        println!("{}", style("Usage Information:").blue().bold());
        for (key, value) in usage.iter().filter(|(_, v)| !v.is_null()) {
            println!("  {key}: {value}");
        }
    }

    if let Some(path) = output {
        tokio::fs::write(&path, &response.text)
            .await
            .with_context(|| format!("writing {}", path.display()))?;
        println!("{}", style(format!("Output saved to {}", path.display())).green());
    }
    Ok(())
}

pub async fn chat(
    settings: &Settings,
    provider: ProviderType,
    system: Option<String>,
    params: &GenerationParams,
) -> anyhow::Result<()> {
    let client = GenAiClient::from_settings(settings);
    client.provider(provider)?;

    let mut messages = Vec::new();
    if let Some(system) = system.filter(|s| !s.trim().is_empty()) {
        messages.push(ChatMessage::system(system));
    }

    println!("{}", style(format!("Starting chat with {provider}")).green().bold());
    println!("{}\n", style("Type 'quit' or 'exit' to end the conversation").dim());

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        stdout
            .write_all(format!("{} ", style("You:").blue().bold()).as_bytes())
            .await?;
        stdout.flush().await?;

        // EOF ends the session like `exit`.
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("quit") || input.eq_ignore_ascii_case("exit") {
            break;
        }

        messages.push(ChatMessage::user(input));
        let bar = spinner("Thinking...");
        let result = client.chat(provider, &messages, params).await;
        bar.finish_and_clear();

        match result {
            Ok(response) => {
                println!("{} {}\n", style("Assistant:").green().bold(), response.text);
                messages.push(ChatMessage::assistant(response.text));
            }
            Err(e) => {
                // Drop the unanswered turn so the transcript stays alternating.
                messages.pop();
                println!("{}", style(format!("Error: {e}")).red());
            }
        }
    }

    println!("{}", style("Chat ended.").dim());
    Ok(())
}

pub async fn batch(
    settings: &Settings,
    provider: ProviderType,
    input: &Path,
    output: &Path,
    concurrent: usize,
    params: &GenerationParams,
) -> anyhow::Result<()> {
    let prompts = read_prompts(input)
        .await
        .with_context(|| format!("reading {}", input.display()))?;
    if prompts.is_empty() {
        bail!("No prompts found in {}", input.display());
    }

    let client = GenAiClient::from_settings(settings);
    client.provider(provider)?;

    let bar = progress_bar(prompts.len());
    bar.set_message(format!("Processing {} prompts", prompts.len()));
    let outcome = client
        .batch_generate_with_progress(provider, &prompts, params, concurrent, |_, _| bar.inc(1))
        .await;
    bar.finish_and_clear();

    let file = BatchFile::from_outcome(&prompts, outcome);
    file.write(output)
        .await
        .with_context(|| format!("writing {}", output.display()))?;

    println!("{}", style("Batch processing completed!").green());
    println!("  Total prompts: {}", file.summary.total_prompts);
    println!("  Successful: {}", file.summary.successful);
    println!("  Failed: {}", file.summary.failed);
    println!("  Results saved to: {}", output.display());
    Ok(())
}

pub async fn providers(settings: &Settings) -> anyhow::Result<()> {
    let client = GenAiClient::from_settings(settings);
    if client.is_empty() {
        println!(
            "{}",
            style("No providers configured. Set OPENAI_API_KEY, GEMINI_API_KEY or AWS_BEARER_TOKEN_BEDROCK.")
                .yellow()
        );
        return Ok(());
    }

    let bar = spinner("Checking provider health...");
    let health = client.health_check_all().await;
    bar.finish_and_clear();

    println!("{}", style("Available Providers").bold());
    println!("{:<10} {:<13} {}", "Provider", "Status", "Models");
    for (provider, info) in client.provider_info() {
        let status = if health.get(&provider).copied().unwrap_or(false) {
            style(format!("{:<13}", "Healthy")).green()
        } else {
            style(format!("{:<13}", "Unavailable")).red()
        };
        println!(
            "{} {} {}",
            style(format!("{:<10}", provider)).cyan(),
            status,
            style(summarize_models(&info.models)).yellow()
        );
    }
    Ok(())
}

pub fn models(settings: &Settings, provider: &str) -> anyhow::Result<()> {
    let client = GenAiClient::from_settings(settings);
    let provider = client.resolve_provider(provider)?;
    println!(
        "{}",
        style(format!("Available models for {provider}:")).cyan().bold()
    );
    for model in client.available_models(provider)? {
        println!("  • {model}");
    }
    Ok(())
}

fn summarize_models(models: &[String]) -> String {
    let mut shown = models
        .iter()
        .take(SHOWN_MODELS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if models.len() > SHOWN_MODELS {
        shown.push_str(&format!(" (+{} more)", models.len() - SHOWN_MODELS));
    }
    shown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_models() {
        let models: Vec<String> = ["a", "b", "c", "d", "e"].iter().map(|s| s.to_string()).collect();
        assert_eq!(summarize_models(&models), "a, b, c (+2 more)");
        assert_eq!(summarize_models(&models[..2]), "a, b");
    }
}
