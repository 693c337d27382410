// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracing setup: full log to `<config-dir>/logs/lv.log`, warnings to stderr

use std::path::Path;
use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log path {}", .0.display())]
    InvalidPath(std::path::PathBuf),

    #[error("failed to create log directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to install tracing subscriber: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// Install the global subscriber. Keep the guard alive until exit or
/// buffered lines are lost.
pub fn setup_logging(log_path: &Path) -> Result<WorkerGuard, LoggingError> {
    use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*, EnvFilter};

    let invalid = || LoggingError::InvalidPath(log_path.to_path_buf());
    let dir = log_path.parent().ok_or_else(invalid)?;
    let file_name = log_path.file_name().ok_or_else(invalid)?;
    std::fs::create_dir_all(dir)?;

    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
        .with(
            fmt::layer()
                .without_time()
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_filter(LevelFilter::WARN),
        )
        .try_init()?;

    Ok(guard)
}
