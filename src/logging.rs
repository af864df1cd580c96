//! Tracing setup: journald on Linux, a daily log file otherwise.
//!
//! Log level comes from `CMXTRACK_LOG` (`debug`, `info`, `warn`, `error`,
//! or any `EnvFilter` directive such as `cmxtrack::service=debug`).
//! Stdout stays reserved for command output.

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_ENV: &str = "CMXTRACK_LOG";

const LOG_FILE_PREFIX: &str = "cmxtrack.log";

/// Flushes the file writer on drop; held for the life of the process.
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Default log directory when journald is unavailable.
pub fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cmxtrack")
        .join("logs")
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. Call once, at startup.
pub fn init(log_dir: Option<PathBuf>) -> Result<()> {
    #[cfg(target_os = "linux")]
    {
        if let Ok(journald) = tracing_journald::layer() {
            tracing_subscriber::registry()
                .with(env_filter())
                .with(journald)
                .try_init()?;
            tracing::info!("Logging to journald");
            return Ok(());
        }
    }

    init_file(&log_dir.unwrap_or_else(default_log_dir))
}

fn init_file(log_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(log_dir)?;

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX));
    let _ = FILE_GUARD.set(guard);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_writer(writer).with_ansi(false).with_target(true))
        .try_init()?;

    tracing::info!("Logging to {}", log_dir.join(LOG_FILE_PREFIX).display());
    Ok(())
}
