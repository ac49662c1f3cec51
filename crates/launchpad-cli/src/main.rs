mod cli;
mod commands;
mod completions;
mod config;
mod error;
mod output;
mod prompt;
mod setup;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use config::LaunchpadConfig;
use launchpad_core::paths;
use setup::prepare_core;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Keep the guard alive so buffered log lines are flushed on exit
    let guard = match init_logging(cli.verbose) {
        Ok(guard) => Some(guard),
        Err(err) => {
            eprintln!("Warning: file logging disabled: {err:#}");
            None
        }
    };

    if let Err(err) = run(cli).await {
        tracing::error!(error = %format!("{err:#}"), "Command failed");
        drop(guard);
        error::handle_error(err);
    }
}

fn init_logging(verbose: bool) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let log_dir = paths::logs_dir()?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "launchpad.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env("LAUNCHPAD_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .init();

    Ok(guard)
}

async fn run(cli: Cli) -> Result<()> {
    let format = cli.format;
    let config = LaunchpadConfig::load(cli.config.as_deref());

    match cli.command {
        Commands::Completions { shell } => {
            completions::generate_completions(shell);
            Ok(())
        }
        Commands::Apps { command } => commands::apps::run(&config, command, format),
        Commands::Open { target } => {
            let core = prepare_core(cli.db_path, &config).await?;
            commands::open::run(core, &config, &target, format).await
        }
        Commands::Hosts { command } => {
            let core = prepare_core(cli.db_path, &config).await?;
            commands::hosts::run(core, command, format).await
        }
        Commands::Validate {
            url,
            username,
            password,
        } => {
            let core = prepare_core(cli.db_path, &config).await?;
            commands::run_validate(core, &url, &username, password, format).await
        }
        Commands::Probe { url } => {
            let core = prepare_core(cli.db_path, &config).await?;
            commands::run_probe(core, &url, format).await
        }
    }
}
