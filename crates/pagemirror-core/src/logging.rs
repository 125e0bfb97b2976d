//! Structured logging for pagemirror.
//!
//! Events go to `$XDG_STATE_HOME/pagemirror/pagemirror.log`. When that file
//! cannot be opened the CLI falls back to [`init_logging_stderr`]. `RUST_LOG`
//! overrides the default filter.

use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,pagemirror=debug,pagemirror_core=debug";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// `~/.local/state/pagemirror/pagemirror.log` unless `XDG_STATE_HOME` says otherwise.
pub fn log_file_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("pagemirror")?;
    // State home already carries the prefix.
    Ok(xdg_dirs.get_state_home().join("pagemirror.log"))
}

/// Install a global subscriber appending to [`log_file_path`].
///
/// Returns `Err` without installing anything if the file cannot be opened.
pub fn init_logging() -> Result<()> {
    let path = log_file_path()?;
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating log directory {}", dir.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    tracing::info!("pagemirror logging initialized at {}", path.display());
    Ok(())
}

/// Stderr-only logging, for when [`init_logging`] fails.
pub fn init_logging_stderr() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}
