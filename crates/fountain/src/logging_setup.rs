//! Subscriber installation for the headless host

use anyhow::{Context, Result};
use fountain_core::LogConfig;
use std::fs::File;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer,
};

/// Keeps the file writer thread alive; drop it last
pub struct LogGuard {
    _worker: WorkerGuard,
}

fn filter(config: &LogConfig) -> EnvFilter {
    // RUST_LOG wins over the configured level
    EnvFilter::builder()
        .with_default_directive(config.parse_level().into())
        .from_env_lossy()
}

/// Install the global subscriber described by `config`
pub fn init(config: &LogConfig) -> Result<Option<LogGuard>> {
    config
        .ensure_log_directory()
        .context("Failed to create log directory")?;

    if config.file_output {
        match config.cleanup_old_logs() {
            Ok(0) => {}
            Ok(removed) => eprintln!("Removed {} old log files", removed),
            Err(e) => eprintln!("Warning: failed to clean up old log files: {}", e),
        }
    }

    let console_layer = config.console_output.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(filter(config))
    });

    let mut guard = None;
    let file_layer = if config.file_output {
        let path = config.current_log_path();
        let file = File::create(&path)
            .with_context(|| format!("Failed to create log file {:?}", path))?;
        let (writer, worker) = tracing_appender::non_blocking(file);
        guard = Some(LogGuard { _worker: worker });
        eprintln!("Logging to {:?}", path);
        Some(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(filter(config)),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();

    tracing::debug!("Logging initialized at level {}", config.level);
    Ok(guard)
}
