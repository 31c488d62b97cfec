//! Command-line driver for the scrape engine.
//!
//! Stands in for the scheduler and UI that live outside this repo: reads a
//! keyword batch from a JSON file, runs a refresh (or replays the failed
//! queue), and prints the `RefreshResult` list as JSON on stdout.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serpwatch_core::Keyword;
use serpwatch_scraper::{RefreshOrchestrator, RetryQueue};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "serpwatch")]
#[command(about = "SERP rank tracking scrape engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scrape every keyword in the batch file and print the results.
    Refresh {
        /// JSON file containing the keyword batch.
        #[arg(long)]
        keywords: PathBuf,
    },
    /// Re-scrape only the keywords whose last attempt failed.
    Retry {
        /// JSON file containing the full keyword batch; the failed subset
        /// is selected from the retry queue.
        #[arg(long)]
        keywords: PathBuf,
    },
    /// Print the keyword IDs currently in the retry queue.
    Queue,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = serpwatch_core::load_config()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_level))
        .init();

    let cli = Cli::parse();
    let queue = RetryQueue::new(&config.queue_path);

    match cli.command {
        Commands::Refresh { keywords } => {
            let batch = load_keywords(&keywords)?;
            let orchestrator = RefreshOrchestrator::new(config.settings)?;
            let results = orchestrator.refresh(&batch, &queue).await;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        Commands::Retry { keywords } => {
            let batch = load_keywords(&keywords)?;
            let failed_ids = queue.list_all().await?;
            let retryable: Vec<Keyword> = batch
                .into_iter()
                .filter(|kw| failed_ids.contains(&kw.id))
                .collect();
            if retryable.len() != failed_ids.len() {
                tracing::warn!(
                    queued = failed_ids.len(),
                    found = retryable.len(),
                    "some queued keyword IDs are missing from the batch file"
                );
            }
            let orchestrator = RefreshOrchestrator::new(config.settings)?;
            let results = orchestrator.refresh(&retryable, &queue).await;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        Commands::Queue => {
            let ids = queue.list_all().await?;
            println!("{}", serde_json::to_string(&ids)?);
        }
    }

    Ok(())
}

fn load_keywords(path: &Path) -> anyhow::Result<Vec<Keyword>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading keyword batch from {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("parsing keyword batch from {}", path.display()))
}
