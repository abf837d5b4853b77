use std::env;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use directories::BaseDirs;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".book-catalog";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "books.sqlite";
/// Log folder inside the application data directory.
const LOG_DIR_NAME: &str = "logs";
/// File name suggested by the export prompt.
const DEFAULT_EXPORT_FILE: &str = "books.csv";

/// Filesystem locations the application works with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    pub log_dir: PathBuf,
    pub default_export_path: PathBuf,
}

impl Config {
    /// Resolve every path relative to the user's home directory, with the
    /// export suggestion placed in the current working directory.
    pub fn load() -> Result<Self> {
        let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
        let export_dir = env::current_dir().unwrap_or_else(|_| base_dirs.home_dir().to_path_buf());
        Ok(Self::rooted_at(base_dirs.home_dir(), &export_dir))
    }

    pub fn rooted_at(home: &Path, export_dir: &Path) -> Self {
        let data_dir = home.join(DATA_DIR_NAME);
        Self {
            db_path: data_dir.join(DB_FILE_NAME),
            log_dir: data_dir.join(LOG_DIR_NAME),
            default_export_path: export_dir.join(DEFAULT_EXPORT_FILE),
        }
    }
}
