use std::fs;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const LOG_FILE_PREFIX: &str = "tribewatch.log";

/// Installs the global subscriber. With a log directory, JSON lines also go
/// to a daily-rolling file; keep the returned guard alive to flush it.
pub fn init_logging(log_dir: Option<&str>) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer());

    let Some(dir) = log_dir else {
        registry.try_init().context("failed to install tracing subscriber")?;
        return Ok(None);
    };

    fs::create_dir_all(dir).with_context(|| format!("failed to create log dir {dir}"))?;
    let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    registry
        .with(fmt::layer().json().with_ansi(false).with_writer(writer))
        .try_init()
        .context("failed to install tracing subscriber")?;
    Ok(Some(guard))
}
