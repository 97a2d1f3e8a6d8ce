// src/logging.rs

//! Diagnostics for the deployment daemon.
//!
//! Batch reports (and the `--dry-run` listing) are the daemon's output and
//! go to stdout, where the build tool captures them. Everything traced
//! through `tracing` goes to stderr, so a verbose level never interleaves
//! with a report. The status board is served separately, see
//! [`crate::status`].
//!
//! Level: `--log-level`, else `POSTDEPLOY_LOG` (`warning` is accepted for
//! `warn`, matching the message kinds), else `info`.

use anyhow::Result;
use tracing_subscriber::fmt;

use crate::cli::LogLevel;

/// Install the stderr subscriber. Called once from `main`, before the
/// settings file is read, so settings errors are traced too.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let level = match cli_level {
        Some(lvl) => level_from_log_level(lvl),
        None => std::env::var("POSTDEPLOY_LOG")
            .ok()
            .and_then(|s| parse_level_str(&s))
            .unwrap_or(tracing::Level::INFO),
    };

    fmt()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn level_from_log_level(lvl: LogLevel) -> tracing::Level {
    match lvl {
        LogLevel::Error => tracing::Level::ERROR,
        LogLevel::Warn => tracing::Level::WARN,
        LogLevel::Info => tracing::Level::INFO,
        LogLevel::Debug => tracing::Level::DEBUG,
        LogLevel::Trace => tracing::Level::TRACE,
    }
}

fn parse_level_str(s: &str) -> Option<tracing::Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(tracing::Level::ERROR),
        "warn" | "warning" => Some(tracing::Level::WARN),
        "info" => Some(tracing::Level::INFO),
        "debug" => Some(tracing::Level::DEBUG),
        "trace" => Some(tracing::Level::TRACE),
        _ => None,
    }
}
