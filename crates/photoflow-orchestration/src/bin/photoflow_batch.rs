//! Photoflow batch runner
//!
//! Sends a set of image files through the remote processing endpoint as one
//! batch and prints the batch report as JSON on stdout. Logs go to stderr.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use photoflow_client::{HttpClientConfig, HttpProcessingClient};
use photoflow_orchestration::BatchOrchestrator;
use photoflow_shared::config::ConfigManager;
use photoflow_shared::logging::init_tracing;
use photoflow_shared::models::SubmittedItem;
use photoflow_shared::store::OutcomeStore;

#[derive(Debug, Parser)]
#[command(name = "photoflow-batch", version)]
#[command(
    about = "Process a batch of images through the remote photoflow endpoint",
    long_about = None
)]
struct Cli {
    /// TOML configuration file (defaults to PHOTOFLOW_CONFIG_PATH when unset)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the remote processing endpoint
    #[arg(long)]
    endpoint: Option<String>,

    /// JSON file the outcome history is persisted to
    #[arg(long)]
    history: Option<PathBuf>,

    /// Image files to process (jpg, jpeg, png, webp)
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let manager = match &cli.config {
        Some(path) => ConfigManager::load_from(Some(path.as_path())),
        None => ConfigManager::load(),
    }
    .context("failed to load configuration")?;

    let mut config = manager.into_config();
    if let Some(endpoint) = cli.endpoint {
        config.remote.endpoint = endpoint;
    }
    if let Some(history) = cli.history {
        config.store.history_path = Some(history);
    }
    let config = ConfigManager::from_config(config)
        .context("invalid command-line overrides")?
        .into_config();

    init_tracing(&config.logging)?;
    info!(
        endpoint = %config.remote.endpoint,
        files = cli.files.len(),
        "photoflow-batch starting"
    );

    let client = HttpProcessingClient::new(HttpClientConfig::from(&config))
        .context("failed to build processing client")?;
    let store = match &config.store.history_path {
        Some(path) => OutcomeStore::open(path).await,
        None => OutcomeStore::in_memory(),
    };

    let mut orchestrator =
        BatchOrchestrator::with_config(Arc::new(client), Arc::new(store), &config);
    for path in &cli.files {
        let item = SubmittedItem::from_path(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        orchestrator.submit(item);
    }

    let report = orchestrator.run_queued().await;
    println!("{}", serde_json::to_string_pretty(&report)?);

    info!(
        succeeded = report.statistics.succeeded,
        failed = report.statistics.failed,
        "photoflow-batch finished"
    );

    Ok(())
}
