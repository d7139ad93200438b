//! Parlor CLI - terminal client for the Parlor chat service

mod commands;
mod config;
mod logging;
mod terminal;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use commands::Commands;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{Level, error, info};

#[derive(Parser)]
#[command(name = "parlor")]
#[command(about = "Chat with your Parlor contacts from the terminal")]
#[command(version)]
struct Cli {
    /// Set logging level
    #[arg(short = 'l', long, global = true, default_value = "warn")]
    log_level: LogLevel,

    /// Data directory for the session file, config and logs
    #[arg(short = 'd', long, global = true)]
    data_dir: Option<PathBuf>,

    /// Configuration file (TOML or YAML); defaults to <data-dir>/config.toml
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Base URL of the chat service, overriding the configuration
    #[arg(short = 'u', long, global = true, env = "PARLOR_BASE_URL")]
    base_url: Option<String>,

    /// Timeout for one-shot commands in seconds (0 = no timeout, chat never times out)
    #[arg(short = 't', long, global = true, default_value = "30")]
    timeout: u64,

    /// Disable file logging (only log to stderr)
    #[arg(long, global = true)]
    no_file_log: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let data_dir = config::resolve_data_dir(cli.data_dir);
    logging::init_logging(cli.log_level.into(), &data_dir, cli.no_file_log)?;

    let client_config =
        config::load_client_config(cli.config.as_deref(), &data_dir, cli.base_url)?;
    info!(base_url = %client_config.base_url, "Starting Parlor CLI");

    let timeout = (cli.timeout > 0 && !cli.command.is_interactive())
        .then(|| Duration::from_secs(cli.timeout));
    let run = cli.command.execute(client_config, data_dir);

    let outcome = match timeout {
        Some(limit) => match tokio::time::timeout(limit, run).await {
            Ok(result) => result,
            Err(_) => {
                error!("Command timed out after {} seconds", cli.timeout);
                std::process::exit(1);
            }
        },
        None => run.await,
    };

    if let Err(e) = outcome {
        error!("Command failed: {e:#}");
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }

    Ok(())
}

#[derive(Clone, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}
