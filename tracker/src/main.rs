//! Main entry point for the tracker binary
//!
//! Wires the orchestrator with real service implementations and runs one
//! pull end to end, emitting the report as JSON.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use shared::{logging, SourceConfig, SourceId};
use tracker::services::{JsonStateStore, ReplayAdapter};
use tracker::PullOrchestrator;

/// Pulls manuscript and referee state from a source and reports quality and
/// changes
#[derive(Parser)]
#[command(name = "tracker")]
#[command(about = "Pulls manuscript state from a source, scores the pull, and reports changes")]
struct Args {
    /// Source identifier; also names the per-source state directory
    #[arg(long)]
    source: String,

    /// Directory of captured manuscript JSON files to replay as the source
    #[arg(long)]
    fixtures: PathBuf,

    /// Base directory for checkpoint and snapshot state
    /// (defaults to $TRACKER_STATE_DIR, then ./state)
    #[arg(long)]
    state_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Quality score required for a full success
    #[arg(long)]
    min_quality: Option<f64>,

    /// Days ahead that count as an approaching deadline
    #[arg(long)]
    deadline_window: Option<i64>,

    /// Seconds allowed for fetching one manuscript
    #[arg(long)]
    timeout: Option<u64>,

    /// Write the report JSON to this path instead of stdout
    #[arg(long)]
    report_out: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    logging::init_tracing(Some(&args.log_level));

    let source_id = SourceId::new(args.source.clone())
        .with_context(|| format!("invalid --source '{}'", args.source))?;

    let mut config = SourceConfig::new(source_id.clone());
    if let Some(min_quality) = args.min_quality {
        config = config.with_min_quality(min_quality);
    }
    if let Some(days) = args.deadline_window {
        config = config.with_deadline_window_days(days);
    }
    if let Some(secs) = args.timeout {
        config = config.with_timeout(Duration::from_secs(secs));
    }

    let state_dir = args
        .state_dir
        .or_else(|| std::env::var("TRACKER_STATE_DIR").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("./state"));

    logging::log_startup(&source_id, "manuscript pull");

    let store = JsonStateStore::open(&state_dir)
        .with_context(|| format!("state directory {} is unusable", state_dir.display()))?;
    let adapter = ReplayAdapter::new(&args.fixtures);

    let mut orchestrator =
        PullOrchestrator::new(config, adapter, store).context("invalid source configuration")?;

    let report = orchestrator.execute().await.context("pull failed")?;

    let json = serde_json::to_string_pretty(&report)?;
    match &args.report_out {
        Some(path) => {
            tokio::fs::write(path, &json)
                .await
                .with_context(|| format!("cannot write report to {}", path.display()))?;
            logging::log_success(
                &source_id,
                &format!("Report written to {}", path.display()),
            );
        }
        None => println!("{json}"),
    }

    Ok(())
}
