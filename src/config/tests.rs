use std::time::Duration;

use tempfile::tempdir;

use super::*;
use crate::densify::DensifyOptions;

#[test]
fn missing_file_yields_defaults() {
    let dir = tempdir().unwrap();
    let loaded = load_from(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(loaded, AppConfig::default());
    assert_eq!(loaded.densify, DensifyOptions::default());
    assert_eq!(loaded.trainer.program, DEFAULT_TRAINER_PROGRAM);
    assert_eq!(
        loaded.trainer.timeout(),
        Some(Duration::from_secs(DEFAULT_TRAINER_TIMEOUT_SECS))
    );
}

#[test]
fn partial_file_keeps_remaining_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cfg.toml");
    std::fs::write(
        &path,
        r#"
[densify]
filler_value = -1.0
fill_interior = true

[trainer]
timeout_secs = 0
"#,
    )
    .unwrap();
    let loaded = load_from(&path).unwrap();
    assert_eq!(loaded.densify.chromaticity_buckets, 6);
    assert_eq!(loaded.densify.filler_value, -1.0);
    assert!(loaded.densify.fill_interior);
    assert_eq!(loaded.trainer.args, vec![DEFAULT_TRAINER_SCRIPT.to_string()]);
    assert_eq!(loaded.trainer.timeout(), None);
}

#[test]
fn clamps_bucket_counts_on_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cfg.toml");
    std::fs::write(
        &path,
        "[densify]\nchromaticity_buckets = 0\nintensity_buckets = 999\n",
    )
    .unwrap();
    let loaded = load_from(&path).unwrap();
    assert_eq!(loaded.densify.chromaticity_buckets, 1);
    assert_eq!(loaded.densify.intensity_buckets, MAX_BUCKETS);
}

#[test]
fn logging_table_is_read_and_sanitized() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cfg.toml");
    std::fs::write(
        &path,
        "[logging]\nfilter = \"huematch::trainer=trace\"\nfile = false\nfiles_kept = 0\n",
    )
    .unwrap();
    let loaded = load_from(&path).unwrap();
    assert_eq!(loaded.logging.filter, "huematch::trainer=trace");
    assert!(!loaded.logging.file);
    assert_eq!(loaded.logging.directory, None);
    assert_eq!(loaded.logging.files_kept, 1);
    assert_eq!(loaded.densify, DensifyOptions::default());
}

#[test]
fn missing_logging_table_uses_defaults() {
    let dir = tempdir().unwrap();
    let loaded = load_from(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(loaded.logging.filter, DEFAULT_LOG_FILTER);
    assert!(loaded.logging.file);
    assert_eq!(loaded.logging.files_kept, DEFAULT_LOG_FILES_KEPT);
}

#[test]
fn invalid_toml_reports_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cfg.toml");
    std::fs::write(&path, "[densify\nbroken").unwrap();
    let err = load_from(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ParseToml { .. }));
    assert!(err.to_string().contains("cfg.toml"));
}

#[test]
fn save_then_load_preserves_values() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join(CONFIG_FILE_NAME);
    let config = AppConfig {
        densify: DensifyOptions {
            chromaticity_buckets: 8,
            intensity_buckets: 4,
            filler_value: 0.0,
            fill_interior: true,
        },
        trainer: TrainerSettings {
            program: "/opt/venv/bin/python3".to_string(),
            args: vec!["train.py".to_string(), "--quiet".to_string()],
            timeout_secs: 45,
        },
        logging: LoggingSettings {
            filter: "huematch=debug,warn".to_string(),
            file: false,
            directory: Some(dir.path().join("logs")),
            files_kept: 4,
        },
    };
    save_to_path(&config, &path).unwrap();
    assert_eq!(load_from(&path).unwrap(), config);

    let leftovers = std::fs::read_dir(path.parent().unwrap())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_name().to_string_lossy().contains(".tmp-"))
        .count();
    assert_eq!(leftovers, 0);
}

#[test]
fn load_or_default_reads_from_app_dir() {
    let dir = tempdir().unwrap();
    let _guard = crate::app_dirs::ConfigBaseGuard::set(dir.path().to_path_buf());
    assert_eq!(load_or_default().unwrap(), AppConfig::default());

    let mut config = AppConfig::default();
    config.trainer.timeout_secs = 12;
    save(&config).unwrap();
    assert!(
        dir.path()
            .join(crate::app_dirs::APP_DIR_NAME)
            .join(CONFIG_FILE_NAME)
            .is_file()
    );
    assert_eq!(load_or_default().unwrap().trainer.timeout_secs, 12);
}
