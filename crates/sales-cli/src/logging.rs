//! Logging infrastructure using `tracing` and `tracing-subscriber`.
//!
//! Library crates emit through `tracing` macros; this module wires the
//! subscriber once at startup based on CLI flags.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format with colors.
    #[default]
    Pretty,
    /// Compact single-line format.
    Compact,
    /// JSON format for machine parsing.
    Json,
}

/// Configuration for logging behavior.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level filter (error, warn, info, debug, trace).
    pub level_filter: LevelFilter,
    /// Honor `RUST_LOG` when no explicit verbosity flag was given.
    pub use_env_filter: bool,
    /// Output format.
    pub format: LogFormat,
    /// Optional log file path. When set, logs are appended to the file.
    pub log_file: Option<PathBuf>,
    /// Whether to use ANSI colors in output.
    pub with_ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level_filter: LevelFilter::WARN,
            use_env_filter: true,
            format: LogFormat::default(),
            log_file: None,
            with_ansi: true,
        }
    }
}

fn build_filter(config: &LogConfig) -> EnvFilter {
    if config.use_env_filter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.level_filter.to_string()))
    } else {
        EnvFilter::new(config.level_filter.to_string())
    }
}

/// Initializes the global subscriber. Must be called at most once.
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let filter = build_filter(config);

    if let Some(path) = &config.log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("open log file: {}", path.display()))?;
        let writer = Arc::new(file);
        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_ansi(false)
            .with_target(false);
        match config.format {
            LogFormat::Pretty => builder.init(),
            LogFormat::Compact => builder.compact().init(),
            LogFormat::Json => builder.json().init(),
        }
        return Ok(());
    }

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(config.with_ansi)
        .with_target(false);
    match config.format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Json => builder.json().init(),
    }
    Ok(())
}
