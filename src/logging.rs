//! File logging via tracing.
//!
//! The terminal belongs to the walkthrough display, so log lines go to a
//! daily-rotated file under the XDG state directory instead. Only the newest
//! week of files is kept.

use anyhow::{Context, Result, anyhow};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::prelude::*;

const LOG_FILE: &str = "cookalong.log";
const MAX_LOG_FILES: usize = 7;

/// Keeps the non-blocking writer flushing until exit
static APPENDER_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Install the global subscriber. `RUST_LOG` filters, default `info`.
pub fn init_logging() -> Result<PathBuf> {
    let log_dir = log_dir()?;

    if let Err(e) = cleanup_old_logs(&log_dir) {
        eprintln!("Warning: failed to clean up old logs: {}", e);
    }

    let (writer, guard) = tracing_appender::non_blocking(rolling::daily(&log_dir, LOG_FILE));
    APPENDER_GUARD
        .set(guard)
        .map_err(|_| anyhow!("logging already initialized"))?;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_ansi(false),
        )
        .try_init()
        .context("failed to install log subscriber")?;

    tracing::debug!(dir = %log_dir.display(), "Logging initialized");
    Ok(log_dir)
}

/// `$XDG_STATE_HOME/cookalong`, else `~/.local/state/cookalong`
fn log_dir() -> Result<PathBuf> {
    let base = match std::env::var_os("XDG_STATE_HOME") {
        Some(state) if !state.is_empty() => PathBuf::from(state),
        _ => dirs::home_dir()
            .ok_or_else(|| anyhow!("could not determine home directory"))?
            .join(".local/state"),
    };
    let dir = base.join("cookalong");
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create log directory {}", dir.display()))?;
    Ok(dir)
}

/// Rotated files are named `cookalong.log.YYYY-MM-DD`
fn is_rotated_log(file_name: &str) -> bool {
    file_name
        .strip_prefix(LOG_FILE)
        .and_then(|rest| rest.strip_prefix('.'))
        .is_some_and(|date| date.len() == 10 && date.matches('-').count() == 2)
}

fn cleanup_old_logs(dir: &Path) -> Result<()> {
    let mut logs: Vec<_> = fs::read_dir(dir)?
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            let name = path.file_name()?.to_string_lossy().into_owned();
            if !is_rotated_log(&name) {
                return None;
            }
            let modified = fs::metadata(&path).ok()?.modified().ok()?;
            Some((path, modified))
        })
        .collect();

    // Newest first
    logs.sort_by(|a, b| b.1.cmp(&a.1));

    for (path, _) in logs.iter().skip(MAX_LOG_FILES) {
        if let Err(e) = fs::remove_file(path) {
            tracing::warn!("Failed to delete old log file {}: {}", path.display(), e);
        }
    }
    Ok(())
}
