//! TOML configuration for densification and the trainer process.
//!
//! Settings live in `config.toml` under the application directory (see
//! [`crate::app_dirs`]). A missing file yields defaults.

mod io;
mod types;

#[cfg(test)]
mod tests;

pub use io::{CONFIG_FILE_NAME, config_path, load_from, load_or_default, save, save_to_path};
pub use types::{
    AppConfig, ConfigError, DEFAULT_LOG_FILES_KEPT, DEFAULT_LOG_FILTER, DEFAULT_TRAINER_PROGRAM,
    DEFAULT_TRAINER_SCRIPT, DEFAULT_TRAINER_TIMEOUT_SECS, LoggingSettings, MAX_BUCKETS,
    TrainerSettings,
};
