//! `genai` binary entry point.

use clap::Parser;
use console::style;
use genai_client::cli::Cli;

#[tokio::main]
async fn main() {
    if let Err(e) = Cli::parse().run().await {
        eprintln!("{} {e:#}", style("Error:").red().bold());
        std::process::exit(1);
    }
}
