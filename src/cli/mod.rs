//! `genai` command-line interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::client::DEFAULT_BATCH_CONCURRENCY;
use crate::params::GenerationParams;
use crate::types::ProviderType;

mod batch_file;
mod commands;

pub use batch_file::{BatchFile, BatchFileEntry, BatchFileError, BatchSummary, read_prompts};

/// Multi-provider GenAI CLI.
#[derive(Parser, Debug)]
#[command(name = "genai", version, about = "Multi-provider GenAI CLI")]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Log filter, e.g. `debug` or `genai_client=trace`.
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

/// Options shared by every command that calls a model.
#[derive(clap::Args, Debug, Clone)]
pub struct ModelArgs {
    /// LLM provider to use.
    #[arg(short, long, value_parser = parse_provider)]
    pub provider: ProviderType,

    /// Specific model to use.
    #[arg(short, long)]
    pub model: Option<String>,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate text from a single prompt.
    Generate {
        #[command(flatten)]
        target: ModelArgs,
        /// Text prompt to generate from.
        #[arg(long)]
        prompt: String,
        /// Maximum tokens to generate.
        #[arg(long)]
        max_tokens: Option<u32>,
        /// Sampling temperature.
        #[arg(long)]
        temperature: Option<f64>,
        /// Top-p sampling parameter.
        #[arg(long)]
        top_p: Option<f64>,
        /// Also write the generated text to this file.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Interactive chat; type `quit` or `exit` to leave.
    Chat {
        #[command(flatten)]
        target: ModelArgs,
        /// System prompt.
        #[arg(long)]
        system: Option<String>,
    },
    /// Run every prompt of a file (one per line) and write JSON results.
    Batch {
        #[command(flatten)]
        target: ModelArgs,
        /// Input file with prompts, one per line.
        #[arg(short, long)]
        input: PathBuf,
        /// Output JSON file.
        #[arg(short, long)]
        output: PathBuf,
        /// Number of concurrent requests.
        #[arg(short, long, default_value_t = DEFAULT_BATCH_CONCURRENCY)]
        concurrent: usize,
        /// Maximum tokens to generate.
        #[arg(long)]
        max_tokens: Option<u32>,
        /// Sampling temperature.
        #[arg(long)]
        temperature: Option<f64>,
    },
    /// List configured providers with their health.
    Providers,
    /// List the models of one provider.
    Models {
        /// Provider id.
        provider: String,
    },
    /// Start the REST API.
    #[cfg(feature = "server")]
    Serve,
}

impl Command {
    #[cfg(feature = "server")]
    fn is_serve(&self) -> bool {
        matches!(self, Self::Serve)
    }

    #[cfg(not(feature = "server"))]
    fn is_serve(&self) -> bool {
        false
    }
}

fn parse_provider(raw: &str) -> Result<ProviderType, String> {
    raw.parse::<ProviderType>().map_err(|_| {
        let valid: Vec<&str> = ProviderType::ALL.iter().map(|p| p.as_str()).collect();
        format!("unknown provider `{raw}`; expected one of {}", valid.join(", "))
    })
}

fn generation_params(
    model: Option<String>,
    max_tokens: Option<u32>,
    temperature: Option<f64>,
    top_p: Option<f64>,
) -> GenerationParams {
    GenerationParams {
        model,
        max_tokens,
        temperature,
        top_p,
    }
}

impl Cli {
    /// Load settings, install logging and run the selected command.
    pub async fn run(self) -> anyhow::Result<()> {
        let mut settings = crate::config::Settings::from_env()?;
        // Interactive commands stay quiet unless asked otherwise.
        match self.log_level {
            Some(level) => settings.log.level = level,
            None if !self.command.is_serve() && std::env::var_os("LOG_LEVEL").is_none() => {
                settings.log.level = "warn".to_string();
            }
            None => {}
        }
        let _guard = crate::logging::init_subscriber(&settings.log)?;

        match self.command {
            Command::Generate {
                target,
                prompt,
                max_tokens,
                temperature,
                top_p,
                output,
            } => {
                let params = generation_params(target.model, max_tokens, temperature, top_p);
                commands::generate(&settings, target.provider, &prompt, &params, output).await
            }
            Command::Chat { target, system } => {
                let params = generation_params(target.model, None, None, None);
                commands::chat(&settings, target.provider, system, &params).await
            }
            Command::Batch {
                target,
                input,
                output,
                concurrent,
                max_tokens,
                temperature,
            } => {
                let params = generation_params(target.model, max_tokens, temperature, None);
                commands::batch(
                    &settings,
                    target.provider,
                    &input,
                    &output,
                    concurrent,
                    &params,
                )
                .await
            }
            Command::Providers => commands::providers(&settings).await,
            Command::Models { provider } => commands::models(&settings, &provider),
            #[cfg(feature = "server")]
            Command::Serve => Ok(crate::server::serve(&settings).await?),
        }
    }
}
