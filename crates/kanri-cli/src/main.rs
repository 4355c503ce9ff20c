mod commands;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;

use kanri_core::config::{AppConfig, BASE_URL_ENV};
use kanri_runtime::Runtime;

/// kanri: terminal client for the admin dashboard
#[derive(Debug, Parser)]
#[command(name = "kanri")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Override the API base URL for this invocation
    #[arg(long, global = true)]
    api: Option<String>,

    #[command(subcommand)]
    command: commands::Command,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load().context("failed to load configuration")?;
    let from_flag = cli.api.is_some();
    if let Some(api) = cli.api {
        config.api.base_url = api;
        config.validate()?;
    }
    let _log_guard = logging::init(&config.logging);

    let runtime = Runtime::new(config).context("failed to start")?;
    tracing::debug!(
        base_url = %runtime.config().api.base_url,
        source = base_url_source(from_flag, AppConfig::base_url_override().is_some()),
        "Runtime ready"
    );
    let result = commands::run(&runtime, cli.command).await;

    for notice in runtime.notices().drain() {
        println!("[{}] {}", notice.kind, notice.message);
    }
    result
}

/// Where the effective API base URL came from. The flag beats the
/// environment, which beats the config file.
fn base_url_source(from_flag: bool, from_env: bool) -> &'static str {
    if from_flag {
        "--api"
    } else if from_env {
        BASE_URL_ENV
    } else {
        "config"
    }
}
