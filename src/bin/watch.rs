use clap::Parser;
use ml_job_tracker::{
    config::AppConfig,
    models::job::JobStatus,
    services::{
        client::JobApiClient,
        poller::{self, WatchError, WatchOptions},
    },
};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Follow a training job on a running tracker until it finishes.
#[derive(Debug, Parser)]
#[command(name = "job-watch", version)]
struct Args {
    /// Job id returned by the submit endpoint.
    job_id: String,

    /// Tracker base URL [default: $API_BASE_URL]
    #[arg(long)]
    base_url: Option<String>,

    /// Delay between status queries in milliseconds [default: $POLL_INTERVAL_MS]
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Give up after this many milliseconds, 0 waits forever [default: $WATCH_TIMEOUT_MS]
    #[arg(long)]
    timeout_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load configuration");
            return ExitCode::from(2);
        }
    };

    let base_url = args.base_url.unwrap_or_else(|| config.api_base_url.clone());
    let options = watch_options(&config, args.interval_ms, args.timeout_ms);

    let client = match JobApiClient::new(&base_url, config.request_timeout()) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            tracing::error!(error = %e, "Failed to build HTTP client");
            return ExitCode::from(2);
        }
    };

    tracing::info!(job_id = %args.job_id, base_url = %base_url, "Watching job");

    let handle = poller::watch_job(client, args.job_id, options, |_| {});

    match handle.wait().await {
        Ok(status) => {
            match serde_json::to_string_pretty(&status) {
                Ok(json) => println!("{json}"),
                Err(e) => tracing::error!(error = %e, "Failed to render status"),
            }
            if status.status == JobStatus::Completed {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            }
        }
        Err(e @ WatchError::Timeout { .. }) => {
            tracing::warn!(error = %e, "Job still running, re-run to keep watching");
            ExitCode::from(2)
        }
        Err(e) => {
            tracing::error!(error = %e, "Watch failed");
            ExitCode::from(2)
        }
    }
}

fn watch_options(
    config: &AppConfig,
    interval_ms: Option<u64>,
    timeout_ms: Option<u64>,
) -> WatchOptions {
    let defaults = config.watch_options();
    let interval = interval_ms.map(Duration::from_millis).unwrap_or(defaults.interval);
    let options = WatchOptions::new(interval);
    match timeout_ms {
        Some(0) => options,
        Some(ms) => options.with_timeout(Duration::from_millis(ms)),
        None => WatchOptions { interval, ..defaults },
    }
}
