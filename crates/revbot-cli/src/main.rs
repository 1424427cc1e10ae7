//! revbot binary: loads the monitor configuration and runs the
//! auto-response polling loop for one project.

mod cli_args;
mod monitor_config;

use anyhow::Result;
use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use cli_args::Cli;
use monitor_config::load_monitor_config;
use revbot_runtime::run_monitor;

fn init_tracing() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = load_monitor_config(&cli.config)?;
    let runtime_config = config.into_runtime_config(
        cli.poll_interval_seconds,
        cli.poll_once,
        cli.request_timeout_ms,
    )?;
    run_monitor(runtime_config).await
}
