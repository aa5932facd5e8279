//! Log setup for the REPL.
//!
//! Logs go to a daily file under the data directory so they never interleave
//! with the prompt. `--verbose` mirrors them to stderr at debug level.

use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

const DEFAULT_FILTER: &str = "gpdi=info";
const VERBOSE_FILTER: &str = "gpdi=debug";

/// Installs the global subscriber. Keep the guard alive until exit so
/// buffered lines are flushed.
pub fn init(logs_dir: &Path, verbose: bool) -> Result<WorkerGuard> {
    let default_filter = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let file_appender = tracing_appender::rolling::daily(logs_dir, "gpdi.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = verbose.then(|| fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(file_writer).with_ansi(false))
        .with(stderr_layer)
        .try_init()
        .context("Failed to install log subscriber")?;

    Ok(guard)
}
