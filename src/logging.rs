//! File logging. The terminal belongs to the TUI, so events never go to
//! stdout; without a log directory they are dropped.

use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_FILE: &str = "infracat.log";
const DEFAULT_FILTER: &str = "info";

/// Installs the global subscriber. Keep the returned guard alive for the
/// lifetime of the process so buffered lines get flushed.
pub fn init_logging(log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let Some(dir) = log_dir else {
        return Ok(None);
    };
    std::fs::create_dir_all(dir).with_context(|| format!("create log dir {}", dir.display()))?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let appender = tracing_appender::rolling::never(dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_ansi(false).with_target(true).with_writer(writer))
        .try_init()
        .context("install log subscriber")?;

    Ok(Some(guard))
}
