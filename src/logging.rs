//! Tracing setup for the huematch tools.
//!
//! Events always go to stderr so stdout stays free for command output. When
//! `[logging] file` is on, each launch also appends to its own
//! `huematch-<timestamp>.log`, and older files beyond `files_kept` are removed.
//! Timestamps in the name sort chronologically, so pruning goes by name.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::{self, time::OffsetTime};
use tracing_subscriber::prelude::*;

use crate::app_dirs::{self, AppDirError};
use crate::config::LoggingSettings;

const LOG_FILE_PREFIX: &str = "huematch-";
const LOG_FILE_SUFFIX: &str = ".log";
/// Directive forced by `--verbose`.
pub const VERBOSE_FILTER: &str = "debug";

/// Log file of the installed subscriber, `None` when logging to stderr only.
static INSTALLED: OnceLock<Option<PathBuf>> = OnceLock::new();
/// Flushes the non-blocking file writer when the process exits.
static FILE_FLUSH: OnceLock<WorkerGuard> = OnceLock::new();

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error(transparent)]
    AppDir(#[from] AppDirError),
    #[error("Log file i/o failed at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to timestamp log file name: {0}")]
    Timestamp(#[from] time::error::Format),
    #[error("Invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),
    #[error("Another tracing subscriber is already installed: {0}")]
    AlreadyInstalled(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Install the global subscriber described by `settings`.
///
/// `RUST_LOG` overrides the filter; otherwise `verbose` selects
/// [`VERBOSE_FILTER`] and the configured filter applies. Returns the log file
/// in use. Later calls return the first call's result without reinstalling.
pub fn init(settings: &LoggingSettings, verbose: bool) -> Result<Option<PathBuf>, LoggingError> {
    if let Some(installed) = INSTALLED.get() {
        return Ok(installed.clone());
    }

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(filter_directive(settings, verbose))?,
    };
    let timer = OffsetTime::new(
        UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC),
        Rfc3339,
    );

    let (file, log_path) = if settings.file {
        let dir = log_dir(settings)?;
        let (file, path) = open_log_file(&dir, now())?;
        let removed = prune_logs(&dir, settings.files_kept)?;
        (Some(file), Some((path, removed)))
    } else {
        (None, None)
    };
    let file_layer = file.map(|file| {
        let (writer, guard) = tracing_appender::non_blocking(file);
        let _ = FILE_FLUSH.set(guard);
        fmt::layer()
            .with_ansi(false)
            .with_timer(timer.clone())
            .with_writer(writer)
    });
    let stderr_layer = fmt::layer()
        .with_target(verbose)
        .with_timer(timer)
        .with_writer(std::io::stderr);

    tracing::subscriber::set_global_default(
        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .with(file_layer),
    )?;

    let log_path = log_path.map(|(path, removed)| {
        tracing::debug!("Logging to {} ({removed} old logs pruned)", path.display());
        path
    });
    Ok(INSTALLED.get_or_init(|| log_path).clone())
}

fn filter_directive(settings: &LoggingSettings, verbose: bool) -> &str {
    if verbose { VERBOSE_FILTER } else { &settings.filter }
}

fn log_dir(settings: &LoggingSettings) -> Result<PathBuf, LoggingError> {
    match &settings.directory {
        Some(dir) => fs::create_dir_all(dir)
            .map(|()| dir.clone())
            .map_err(|source| LoggingError::Io {
                path: dir.clone(),
                source,
            }),
        None => Ok(app_dirs::logs_dir()?),
    }
}

fn now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

fn log_file_name(started: OffsetDateTime) -> Result<String, time::error::Format> {
    let stamp = started.format(format_description!(
        "[year][month][day]T[hour][minute][second]"
    ))?;
    Ok(format!("{LOG_FILE_PREFIX}{stamp}{LOG_FILE_SUFFIX}"))
}

/// Open this launch's log file for appending; relaunching within a second reuses it.
fn open_log_file(dir: &Path, started: OffsetDateTime) -> Result<(File, PathBuf), LoggingError> {
    let path = dir.join(log_file_name(started)?);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|source| LoggingError::Io {
            path: path.clone(),
            source,
        })?;
    Ok((file, path))
}

/// Delete all but the `keep` newest huematch logs in `dir`; returns how many went.
fn prune_logs(dir: &Path, keep: usize) -> Result<usize, LoggingError> {
    let entries = fs::read_dir(dir).map_err(|source| LoggingError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut logs: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| is_log_file(path))
        .collect();
    logs.sort();
    let stale = logs.len().saturating_sub(keep);
    for path in &logs[..stale] {
        fs::remove_file(path).map_err(|source| LoggingError::Io {
            path: path.clone(),
            source,
        })?;
    }
    Ok(stale)
}

fn is_log_file(path: &Path) -> bool {
    path.is_file()
        && path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with(LOG_FILE_PREFIX) && name.ends_with(LOG_FILE_SUFFIX))
}
