use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use huematch::app_dirs::{APP_DIR_NAME, CONFIG_HOME_ENV};
use huematch::config::CONFIG_FILE_NAME;
use tempfile::TempDir;

/// Held by whichever test currently owns `HUEMATCH_CONFIG_HOME`.
static CONFIG_HOME_OWNER: Mutex<()> = Mutex::new(());

/// A throwaway config home that `HUEMATCH_CONFIG_HOME` points at while alive.
///
/// The previous value comes back on drop, before the directory is removed.
pub struct ConfigHome {
    dir: TempDir,
    previous: Option<OsString>,
    _owner: MutexGuard<'static, ()>,
}

impl ConfigHome {
    pub fn new() -> Self {
        let owner = CONFIG_HOME_OWNER
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let dir = tempfile::tempdir().expect("temp config home");
        let previous = std::env::var_os(CONFIG_HOME_ENV);
        point_config_home_at(Some(dir.path().as_os_str()));
        Self {
            dir,
            previous,
            _owner: owner,
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Where `config::config_path` should resolve under this home.
    pub fn config_file(&self) -> PathBuf {
        self.dir.path().join(APP_DIR_NAME).join(CONFIG_FILE_NAME)
    }

    pub fn write_config(&self, toml: &str) -> PathBuf {
        let path = self.config_file();
        std::fs::create_dir_all(path.parent().expect("config file has a parent"))
            .expect("create app dir");
        std::fs::write(&path, toml).expect("write config");
        path
    }
}

impl Drop for ConfigHome {
    fn drop(&mut self) {
        point_config_home_at(self.previous.as_deref());
    }
}

fn point_config_home_at(value: Option<&OsStr>) {
    // SAFETY: only the holder of CONFIG_HOME_OWNER mutates the environment.
    unsafe {
        match value {
            Some(value) => std::env::set_var(CONFIG_HOME_ENV, value),
            None => std::env::remove_var(CONFIG_HOME_ENV),
        }
    }
}
