//! pmcmap-si - Subject Ingest service
//!
//! Aggregates PMC subject-classification metadata into one combined tree:
//! fetch each article's OAI-PMH record, parse its classification hierarchy,
//! and merge the resulting subject paths with per-topic article counts and
//! per-article leaves.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pmcmap_common::Config;
use pmcmap_si::models::article_id::PmcId;
use pmcmap_si::services::orchestrator::Orchestrator;
use pmcmap_si::services::registry_client::RegistryClient;
use pmcmap_si::storage::{FileTreeStore, TreeStore};

#[derive(Parser, Debug)]
#[command(
    name = "pmcmap-si",
    about = "Aggregate PMC subject classifications into one combined tree",
    version
)]
struct Args {
    /// Article identifiers (PMC id or article URL)
    ids: Vec<String>,

    /// File with one identifier or article URL per line
    #[arg(long)]
    input: Option<PathBuf>,

    /// Configuration file path
    #[arg(long, env = "PMCMAP_CONFIG")]
    config: Option<PathBuf>,

    /// Output directory (overrides configuration)
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Destination file name (default: timestamped)
    #[arg(long)]
    output: Option<String>,

    /// Worker pool size (overrides configuration)
    #[arg(long)]
    workers: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let mut config = Config::resolve(args.config.as_deref())?;
    if let Some(dir) = args.output_dir.clone() {
        config.output_dir = dir;
    }
    if let Some(workers) = args.workers {
        config.workers = workers.max(1);
    }

    let ids = collect_ids(&args)?;
    if ids.is_empty() {
        anyhow::bail!("No article identifiers given (positional ids or --input)");
    }

    info!("Starting pmcmap-si (Subject Ingest)");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!(
        articles = ids.len(),
        workers = config.workers,
        registry = %config.registry_url,
        "Run configured"
    );

    let client =
        Arc::new(RegistryClient::new(&config).context("Failed to create registry client")?);
    let orchestrator = Orchestrator::new(client, config.workers);

    let (tree, summary) = orchestrator.run(&ids).await;

    let payload = tree.to_json()?;
    let store = FileTreeStore::new(&config.output_dir);
    let name = args.output.unwrap_or_else(FileTreeStore::timestamped_name);
    let path = store.store(&payload, &name)?;

    info!(
        aggregated = summary.aggregated,
        skipped = summary.skipped(),
        empty_records = summary.empty_records,
        paths = summary.paths_inserted,
        distinct_topics = summary.topic_labels.len(),
        output = %path.display(),
        "Run complete"
    );

    Ok(())
}

/// Merge positional identifiers with the `--input` file. Each entry is a PMC
/// id or an article URL (reduced to its id); blank lines and `#` comments in
/// the file are ignored.
fn collect_ids(args: &Args) -> Result<Vec<String>> {
    let mut ids: Vec<String> = args.ids.iter().map(|raw| normalize_entry(raw)).collect();

    if let Some(path) = &args.input {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read input list {}", path.display()))?;
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            ids.push(normalize_entry(line));
        }
    }

    Ok(ids)
}

/// Reduce an article URL to its PMC id; anything else passes through for the
/// orchestrator's shape check to judge.
fn normalize_entry(raw: &str) -> String {
    match PmcId::from_url(raw) {
        Some(id) => id.as_str().to_string(),
        None => raw.trim().to_string(),
    }
}
