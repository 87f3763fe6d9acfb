//! hostprobe
//!
//! Pulls the computer list from the asset-management API, infers each host's
//! operating-system family from open TCP ports and writes the enriched
//! inventory as CSV for monitoring tools.

use std::path::PathBuf;

use chrono::Utc;
use clap::Parser;
use color_eyre::Result;
use eyre::WrapErr;
use hostprobe_core::{AssetSource, BatchOrchestrator, RunSummary, export_csv};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod source;

use config::{Config, LogConfig};
use source::GlpiAssetSource;

/// Asset inventory OS prober
#[derive(Parser, Debug)]
#[command(name = "hostprobe", version, about)]
struct Args {
    /// Configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// CSV output path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Maximum number of hosts probed at once
    #[arg(long)]
    concurrency: Option<usize>,

    /// Connect timeout per probe in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Stop probing after this many seconds
    #[arg(long)]
    deadline_secs: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

impl Args {
    /// Command-line flags override file and environment values
    fn apply(&self, config: &mut Config) {
        if let Some(output) = &self.output {
            config.export.path.clone_from(output);
        }
        if let Some(concurrency) = self.concurrency {
            config.probe.concurrency = concurrency;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.probe.probe_timeout_ms = timeout_ms;
        }
        if self.deadline_secs.is_some() {
            config.probe.deadline_secs = self.deadline_secs;
        }
        if let Some(level) = &self.log_level {
            config.log.level.clone_from(level);
        }
        if self.json_logs {
            config.log.json = true;
        }
    }
}

/// Install the tracing subscriber; `RUST_LOG` takes precedence over the configured level
fn init_logging(log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));

    let registry = tracing_subscriber::registry().with(filter);
    if log.json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let args = Args::parse();

    let config_path = Config::discover(args.config.as_deref());
    let mut config = match &config_path {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    config.apply_env(|key| std::env::var(key).ok())?;
    args.apply(&mut config);

    init_logging(&config.log);
    match &config_path {
        Some(path) => info!(path = %path.display(), "loaded configuration"),
        None => warn!("no config file found, using defaults and environment"),
    }

    config.validate()?;
    run(config).await
}

async fn run(config: Config) -> Result<()> {
    let started_at = Utc::now();

    let source = GlpiAssetSource::new(&config.api)?;
    let hostnames = source
        .fetch_hostnames()
        .await
        .wrap_err("cannot obtain the host list, no export written")?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, finishing with partial results");
            on_interrupt.cancel();
        }
    });

    let orchestrator = BatchOrchestrator::from_config(&config.probe);
    let records = orchestrator.run(&hostnames, cancel).await;

    export_csv(&records, &config.export.path)?;
    RunSummary::new(&records, started_at).log();

    info!("done");
    Ok(())
}
