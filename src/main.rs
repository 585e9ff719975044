//! rotest-board - live dashboard for rotest resources
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use rotest_board::cli::{commands, Cli, Commands};
use rotest_board::config::{Config, ConfigManager};
use rotest_board::error::BoardResult;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> BoardResult<()> {
    let cli = Cli::parse();

    let manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let file_config = manager.load().await?;

    init_logging(cli.verbose, &file_config);
    rotest_board::ui::init_theme();
    debug!("Loaded configuration from {}", manager.path().display());

    // `config` edits the file, so it must not see the flag overrides
    let config = with_overrides(file_config.clone(), &cli);

    match cli.command {
        Commands::Watch(args) => commands::watch(args, &config).await,
        Commands::Snapshot(args) => commands::snapshot(args, &config).await,
        Commands::Lock(args) => commands::lock(args, &config).await,
        Commands::Release(args) => commands::release(args, &config).await,
        Commands::Config(args) => commands::config(args, &file_config, &manager).await,
    }
}

/// 0 = warn, 1 = info, 2+ = debug
fn init_logging(verbose: u8, config: &Config) {
    let filter = match verbose {
        0 => EnvFilter::new("rotest_board=warn"),
        1 => EnvFilter::new("rotest_board=info"),
        _ => EnvFilter::new("rotest_board=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if config.general.log_format == "json" {
        builder.json().init();
    } else {
        builder.without_time().init();
    }
}

/// Command line flags win over the config file
fn with_overrides(mut config: Config, cli: &Cli) -> Config {
    if let Some(ref host) = cli.host {
        config.feed.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.feed.port = port;
    }
    config
}
