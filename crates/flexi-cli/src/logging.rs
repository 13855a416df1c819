//! Tracing setup for the `flexi` binary.

use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub const LOG_FILE_NAME: &str = "flexi.log";

/// `RUST_LOG` when set, otherwise the configured level for the workspace
/// crates and `warn` for everything else.
pub fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = default_level.trim();
        EnvFilter::try_new(format!(
            "warn,flexi_core={level},flexi_infrastructure={level},flexi_interaction={level},flexi_application={level},flexi_cli={level}"
        ))
        .unwrap_or_else(|_| EnvFilter::new("warn"))
    })
}

/// Installs the global subscriber: a daily-rolling file under `logs_dir`
/// (when given), plus stderr when `verbose`.
///
/// The returned guard flushes the file writer on drop; keep it alive for the
/// whole run.
pub fn init(logs_dir: Option<&Path>, default_level: &str, verbose: bool) -> Result<Option<WorkerGuard>> {
    let (file_layer, guard) = match logs_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let file_appender = tracing_appender::rolling::daily(dir, LOG_FILE_NAME);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };
    let stderr_layer = verbose.then(|| fmt::layer().with_writer(std::io::stderr).with_target(false));

    tracing_subscriber::registry()
        .with(env_filter(default_level))
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}
