use std::path::Path;

use clap::Parser;
use ragbot::cli::handle_ask;
use ragbot::cli::handle_index;
use ragbot::cli::handle_init;
use ragbot::cli::handle_keygen;
use ragbot::cli::handle_serve;
use ragbot::cli::Cli;
use ragbot::cli::Commands;
use ragbot::config::AppConfig;
use ragbot::Result;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Key generation needs neither configuration nor logging
    if matches!(cli.command, Commands::Keygen) {
        return handle_keygen();
    }

    // Load configuration
    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };

    // Initialize logging
    if cli.verbose {
        ragbot::logging::init_logging_with_level("debug", Path::new(&config.logging.log_dir))?;
    } else {
        ragbot::logging::init_logging_with_config(&config)?;
    }
    info!("Configuration loaded successfully");

    // Execute the requested command
    match cli.command {
        Commands::Serve { host, port, cors } => handle_serve(&config, host, port, cors).await,
        Commands::Ask { question, sources } => handle_ask(&config, &question, sources).await,
        Commands::Index => handle_index(&config).await,
        Commands::Init => handle_init(&config).await,
        Commands::Keygen => handle_keygen(),
    }
}
