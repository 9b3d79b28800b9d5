//! Logging setup
//!
//! Progress messages go through a single `tracing` subscriber with two
//! outputs: the console and, during ingestion, the plain-text run log. The
//! run log is truncated when the subscriber is built. `-q` and `RUST_LOG`
//! narrow the console only; the run log always keeps progress at info level.

use std::fs::{self, File};
use std::io;
use std::path::Path;
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter for a verbosity level, ignoring the environment
fn level_filter(verbose: u8, quiet: bool) -> EnvFilter {
    if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("audioshelf=info,warn"),
            1 => EnvFilter::new("audioshelf=debug,info"),
            2 => EnvFilter::new("audioshelf=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    }
}

/// Builds the console filter for a verbosity level
///
/// `RUST_LOG`, when set, replaces the level chosen from the flags.
pub fn verbosity_filter(verbose: u8, quiet: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| level_filter(verbose, quiet))
}

/// Installs console-only logging
pub fn init_console_logging(verbose: u8, quiet: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(verbosity_filter(verbose, quiet))
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Builds the console + run-log subscriber without installing it
///
/// The file at `log_path` is created or truncated. `-v` raises the run log's
/// level along with the console's; nothing lowers it below info.
///
/// # Returns
///
/// * `Ok((subscriber, guard))` - The guard flushes the run log when dropped
/// * `Err(io::Error)` - The run log could not be created
pub fn run_subscriber(
    verbose: u8,
    quiet: bool,
    log_path: &Path,
) -> io::Result<(impl Subscriber + Send + Sync + 'static, WorkerGuard)> {
    if let Some(parent) = log_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let file = File::create(log_path)?;
    let (file_writer, guard) = tracing_appender::non_blocking(file);

    let console_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(io::stdout)
        .with_filter(verbosity_filter(verbose, quiet));

    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(file_writer)
        .with_filter(level_filter(verbose, false));

    let subscriber = tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer);

    Ok((subscriber, guard))
}

/// Installs logging to the console and to the run log at `log_path`
///
/// The returned guard must be kept alive for the whole run.
pub fn init_run_logging(verbose: u8, quiet: bool, log_path: &Path) -> io::Result<WorkerGuard> {
    let (subscriber, guard) = run_subscriber(verbose, quiet, log_path)?;
    subscriber.init();
    Ok(guard)
}
