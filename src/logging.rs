//! File-backed tracing setup. The terminal belongs to the UI, so log lines go
//! to a daily rolling file inside the data directory instead of stderr.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LOG_FILE_PREFIX: &str = "book-catalog.log";
const DEFAULT_LEVEL: &str = "info";

/// Install the global subscriber. `RUST_LOG` overrides the default level. Keep
/// the returned guard alive until shutdown so buffered lines get flushed.
pub fn init_tracing(log_dir: &Path) -> Result<WorkerGuard> {
    fs::create_dir_all(log_dir).context("failed to create log directory")?;

    let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer).with_ansi(false).with_target(false))
        .try_init()
        .context("failed to install tracing subscriber")?;

    Ok(guard)
}
