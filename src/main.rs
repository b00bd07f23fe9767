// src/main.rs

//! ffwatch CLI entry point.
//!
//! Composes the clock, fetcher, cache, data service, and poller, then either
//! runs the poll loop, answers a single command, or validates configuration.

use std::sync::Arc;

use clap::{Parser, Subcommand};

use ffwatch::bot::{self, Command as BotCommand};
use ffwatch::cache::FreshnessCache;
use ffwatch::clock::{Clock, SystemClock};
use ffwatch::error::{AppError, Result};
use ffwatch::poller::Poller;
use ffwatch::services::{DataService, FetchContent, SourceFetcher};

#[derive(Parser, Debug)]
#[command(
    name = "ffwatch",
    version,
    about = "Free Fire data cache and command responder"
)]
struct Cli {
    #[arg(short, long, default_value = "data/config.toml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the background poller until interrupted
    Run,
    /// Refresh once and print a command response
    Once {
        /// Command to answer (updates, events, characters, version)
        #[arg(long, default_value = "updates")]
        command: String,
    },
    /// Validate the configuration file
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ffwatch::config::load(&cli.config);

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(&config.logging.level),
    )
    .init();

    config.validate()?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let cache = Arc::new(FreshnessCache::new());
    let fetcher: Arc<dyn FetchContent> = Arc::new(SourceFetcher::from_config(&config.sources)?);
    let service = Arc::new(DataService::new(
        cache,
        fetcher,
        clock,
        &config.freshness,
    ));

    match cli.command {
        Command::Run => run(service, &config).await,
        Command::Once { command } => once(&service, &config, &command).await,
        Command::Validate => {
            log::info!("configuration is valid");
            Ok(())
        }
    }
}

/// Run the poller until ctrl-c, logging the health signal periodically.
async fn run(service: Arc<DataService>, config: &ffwatch::models::Config) -> Result<()> {
    let poller = Poller::new(Arc::clone(&service), &config.freshness);
    let handle = poller.spawn();

    let mut health_interval = tokio::time::interval(std::time::Duration::from_secs(60));
    health_interval.tick().await; // first tick is immediate

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                log::info!("shutting down");
                break;
            }
            _ = health_interval.tick() => {
                let health = service.health();
                match serde_json::to_string(&health) {
                    Ok(json) => log::info!("health: {json}"),
                    Err(error) => log::warn!("health serialization failed: {error}"),
                }
            }
        }
    }

    handle.abort();
    Ok(())
}

/// Answer one command against a fresh cache and print the chunks.
async fn once(
    service: &DataService,
    config: &ffwatch::models::Config,
    command: &str,
) -> Result<()> {
    let command = BotCommand::parse(command)
        .ok_or_else(|| AppError::config(format!("unknown command: {command}")))?;

    let chunks = bot::respond(service, &config.bot, command, "operator").await;
    for chunk in chunks {
        println!("{chunk}");
    }
    Ok(())
}
