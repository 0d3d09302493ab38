//! ClipReview CLI
//!
//! Headless front end to the clip store and playback controller.
//!
//! # Usage
//!
//! ```bash
//! clipreview scan
//! clipreview add --video lesson1.mp4 --start 30 --end 40
//! clipreview play --video lesson1.mp4 --clip 1 --loop --rate 0.75x --seconds 20
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use clipreview::app::AppContainer;
use clipreview::cli::{commands, Cli, Commands};
use clipreview::config_initialization::initialize_configuration;
use clipreview::utils::logging::{LogFormat, LogLevel, LoggingConfig, LoggingSystem};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = initialize_configuration(&cli).context("Failed to load configuration")?;
    LoggingSystem::new(LoggingConfig {
        level: LogLevel::parse(&config.log_level)?,
        format: LogFormat::parse(&cli.log_format)?,
    })
    .initialize()?;

    let container = AppContainer::new(config)?;
    info!(clip_dir = %container.clip_dir().display(), "Starting ClipReview");

    match cli.command {
        Commands::Scan => commands::scan(&container),
        Commands::List(args) => commands::list(&container, args),
        Commands::Add(args) => commands::add(&container, args),
        Commands::Delete(args) => commands::delete(&container, args),
        Commands::Play(args) => commands::play(&container, args).await,
        Commands::Config => commands::config(&container),
    }
}
