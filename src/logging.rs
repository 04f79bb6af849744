//! Logging configuration for ragbot

use std::path::Path;

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::{self};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Registry;

use crate::Result;

/// Initialize logging with configuration
pub fn init_logging_with_config(config: &crate::config::AppConfig) -> Result<()> {
    let level = &config.logging.level;
    let env_filter = EnvFilter::new(format!("{level},ragbot={level}"));
    init_registry(env_filter, Path::new(&config.logging.log_dir), level)
}

/// Initialize logging with custom log level, honoring `RUST_LOG` when set
pub fn init_logging_with_level(level: &str, log_dir: &Path) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{level},ragbot={level}")));
    init_registry(env_filter, log_dir, level)
}

fn init_registry(env_filter: EnvFilter, log_dir: &Path, level: &str) -> Result<()> {
    // Create logs directory if it doesn't exist
    if !log_dir.exists() {
        std::fs::create_dir_all(log_dir)?;
    }

    let file_appender = tracing_appender::rolling::daily(log_dir, "ragbot.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr);

    let file_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(non_blocking)
        .with_ansi(false); // No colors in file

    Registry::default()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| crate::RagbotError::Custom(format!("Failed to initialize logging: {e}")))?;

    tracing::info!("Logging initialized with level: {} - console and file output enabled", level);
    tracing::info!(
        "Log files will be saved to: {}/ragbot.log.YYYY-MM-DD",
        log_dir.display()
    );

    // Keep the writer alive for the lifetime of the process
    std::mem::forget(guard);

    Ok(())
}

/// Initialize simple console logging for tests and one-shot commands
pub fn init_simple_logging() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(true)
        .with_env_filter(EnvFilter::new("info,ragbot=debug"))
        .with_test_writer()
        .try_init()
        .map_err(|e| crate::RagbotError::Custom(format!("Failed to initialize logging: {e}")))?;

    tracing::info!("Simple logging initialized");
    Ok(())
}
