use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

mod api;
mod app;
mod card;
mod config;
mod event_loop;
mod form;
mod protocol;
mod task;
mod task_list;
mod ui;

use api::HttpTaskApi;
use app::App;
use config::Config;

const LOG_FILE: &str = "taskers.log";

/// Terminal to-do list backed by a `/tasks` REST service.
#[derive(Parser, Debug)]
#[command(name = "taskers", version, about)]
struct Cli {
    /// Backend root URL; overrides `server.base_url` from the config file.
    #[arg(long)]
    server: Option<String>,

    /// Config file to read instead of the per-user default.
    #[arg(long)]
    config: Option<PathBuf>,

    /// More log output (repeatable).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Less log output (repeatable).
    #[arg(short, long, action = clap::ArgAction::Count)]
    quiet: u8,
}

impl Cli {
    fn log_level<'a>(&self, configured: &'a str) -> &'a str {
        match (self.verbose, self.quiet) {
            (0, 0) => configured,
            (_, q) if q >= 2 => "error",
            (_, 1) => "warn",
            (1, _) => "debug",
            _ => "trace",
        }
    }
}

/// Logs go to a file since the terminal belongs to the UI. `RUST_LOG` wins
/// over the configured level.
fn install_tracing(config: &Config, level: &str) -> Result<WorkerGuard> {
    let directory = config.log_directory();
    std::fs::create_dir_all(&directory)
        .with_context(|| format!("failed to create log directory {}", directory.display()))?;
    let appender = tracing_appender::rolling::never(&directory, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow!("failed to install log subscriber: {err}"))?;
    Ok(guard)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(server) = &cli.server {
        config.server.base_url = server.clone();
    }
    let base_url = config.base_url()?;

    let _log_guard = install_tracing(&config, cli.log_level(&config.log.level))?;
    match Config::source(cli.config.as_deref()) {
        Some(path) => tracing::info!(config = %path.display(), %base_url, "starting"),
        None => tracing::info!(%base_url, "starting with default config"),
    }

    let api = Arc::new(HttpTaskApi::new(&base_url).context("unusable backend url")?);
    tokio::runtime::Runtime::new()
        .context("failed to start async runtime")?
        .block_on(event_loop::run(App::new(), api))
}
