//! Offcache - offline cache manager
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use offcache::cli::{commands, Cli, Commands, WorkerHost};
use offcache::config::{Config, ConfigManager};
use offcache::error::OffcacheResult;
use offcache::ui::{self, UiContext};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            } else if e.is_retryable() {
                eprintln!("{} The failure may be temporary; try again", style("Hint:").yellow());
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> OffcacheResult<()> {
    let cli = Cli::parse();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let config = config_manager.load().await?;

    init_logging(cli.verbose, &config);

    let ctx = UiContext::detect();
    if ctx.use_fancy_output() {
        ui::init_theme();
    }

    let host = WorkerHost::new(&config, &ctx);

    match cli.command {
        Commands::Install(args) => commands::install(args, &host).await,
        Commands::Activate => commands::activate(&host).await,
        Commands::Fetch(args) => commands::fetch(args, &host).await,
        Commands::Message(args) => commands::message(args, &host).await,
        Commands::Sync(args) => commands::sync(args, &host).await,
        Commands::PeriodicSync(args) => commands::periodic_sync(args, &host).await,
        Commands::Push(args) => commands::push(args, &host).await,
        Commands::Status(args) => commands::status(args, &host).await,
        Commands::Namespaces(args) => commands::namespaces(args, &host).await,
        Commands::Content(args) => commands::content(args, &host).await,
        Commands::Clear(args) => commands::clear(args, &host).await,
        Commands::Config(args) => commands::config(args, &config_manager, &config).await,
    }
}

/// 0 = warn, 1 = info, 2+ = debug; `general.log_format = "json"` switches formatter
fn init_logging(verbose: u8, config: &Config) {
    let filter = match verbose {
        0 => EnvFilter::new("offcache=warn"),
        1 => EnvFilter::new("offcache=info"),
        _ => EnvFilter::new("offcache=debug"),
    };

    if config.general.log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .without_time()
            .with_writer(std::io::stderr)
            .init();
    }
}
