use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::densify::DensifyOptions;

/// Largest bucket count accepted per axis; the grid is allocated densely.
pub const MAX_BUCKETS: usize = 64;
pub const DEFAULT_TRAINER_PROGRAM: &str = "python3";
pub const DEFAULT_TRAINER_SCRIPT: &str = "classifier.py";
pub const DEFAULT_TRAINER_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_LOG_FILTER: &str = "info";
pub const DEFAULT_LOG_FILES_KEPT: usize = 10;

/// Settings persisted in `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub densify: DensifyOptions,
    pub trainer: TrainerSettings,
    pub logging: LoggingSettings,
}

impl AppConfig {
    /// Clamp values that would make the grid unusable or oversized.
    pub(crate) fn normalized(mut self) -> Self {
        self.densify.chromaticity_buckets =
            clamp_buckets("chromaticity_buckets", self.densify.chromaticity_buckets);
        self.densify.intensity_buckets =
            clamp_buckets("intensity_buckets", self.densify.intensity_buckets);
        if !self.densify.filler_value.is_finite() {
            tracing::warn!("Ignoring non-finite filler_value in config");
            self.densify.filler_value = DensifyOptions::default().filler_value;
        }
        if self.logging.files_kept == 0 {
            tracing::warn!("Config files_kept=0 would delete the current log; keeping 1");
            self.logging.files_kept = 1;
        }
        self
    }
}

fn clamp_buckets(name: &str, value: usize) -> usize {
    let clamped = value.clamp(1, MAX_BUCKETS);
    if clamped != value {
        tracing::warn!("Config {name}={value} out of range; using {clamped}");
    }
    clamped
}

/// How to launch the external trainer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerSettings {
    pub program: String,
    pub args: Vec<String>,
    /// Seconds before the trainer is killed; `0` waits forever.
    pub timeout_secs: u64,
}

impl Default for TrainerSettings {
    fn default() -> Self {
        Self {
            program: DEFAULT_TRAINER_PROGRAM.to_string(),
            args: vec![DEFAULT_TRAINER_SCRIPT.to_string()],
            timeout_secs: DEFAULT_TRAINER_TIMEOUT_SECS,
        }
    }
}

impl TrainerSettings {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

/// Where and how verbosely the tools log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
    /// Write a per-launch log file in addition to stderr.
    pub file: bool,
    /// Log file directory; `<app dir>/logs` when unset.
    pub directory: Option<PathBuf>,
    /// Newest log files kept after pruning, the current one included.
    pub files_kept: usize,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
            file: true,
            directory: None,
            files_kept: DEFAULT_LOG_FILES_KEPT,
        }
    }
}

/// Errors that may occur while loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No platform config directory could be resolved.
    #[error("No suitable directory available for configuration")]
    NoConfigDir,
    /// Failed to create the config directory.
    #[error("Unable to create config directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to read a config file.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to write a config file.
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to parse TOML config.
    #[error("Invalid config at {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// Failed to serialize config to TOML.
    #[error("Failed to serialize config to TOML at {path}: {source}")]
    SerializeToml {
        path: PathBuf,
        source: toml::ser::Error,
    },
}
