// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Logging initialization
//!
//! Console output is always on. With the `file-logging` feature and a log
//! directory, every event is also written as JSON to `neuroplace.log`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::cli::CrateDebugFlags;

/// Keeps file writers alive; drop it last so buffered lines are flushed
pub struct LoggingGuard {
    #[cfg(feature = "file-logging")]
    _file_guard: Option<tracing_appender::non_blocking::WorkerGuard>,
    log_dir: Option<PathBuf>,
}

impl LoggingGuard {
    /// Directory holding the log file, if file logging is active
    pub fn log_dir(&self) -> Option<&Path> {
        self.log_dir.as_deref()
    }
}

/// Build the filter: `RUST_LOG` if set, else debug flags over `level`
pub fn build_filter(debug_flags: &CrateDebugFlags, level: &str) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    let directives = debug_flags.to_filter_string(level);
    EnvFilter::try_new(&directives).with_context(|| format!("Invalid log filter: {}", directives))
}

/// Install the global subscriber
///
/// # Arguments
/// * `debug_flags` - Per-crate debug flags
/// * `level` - Default level for everything not flagged
/// * `log_dir` - Directory for the JSON log file (ignored without `file-logging`)
///
/// # Errors
///
/// Fails on an invalid filter, an unwritable log directory, or if a global
/// subscriber is already installed.
pub fn init_logging(
    debug_flags: &CrateDebugFlags,
    level: &str,
    log_dir: Option<PathBuf>,
) -> Result<LoggingGuard> {
    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(debug_flags.any_enabled())
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .with_filter(build_filter(debug_flags, level)?);
    #[cfg_attr(not(feature = "file-logging"), allow(unused_mut))]
    let mut layers = vec![console_layer.boxed()];

    #[cfg(feature = "file-logging")]
    let file_guard = match &log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
            let appender = tracing_appender::rolling::never(dir, "neuroplace.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .json()
                .with_filter(build_filter(debug_flags, level)?)
                .boxed();
            layers.push(file_layer);
            Some(guard)
        }
        None => None,
    };

    #[cfg(not(feature = "file-logging"))]
    let log_dir: Option<PathBuf> = log_dir.and(None);

    Registry::default()
        .with(layers)
        .try_init()
        .context("A global tracing subscriber is already installed")?;

    Ok(LoggingGuard {
        #[cfg(feature = "file-logging")]
        _file_guard: file_guard,
        log_dir,
    })
}
