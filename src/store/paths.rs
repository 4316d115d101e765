use std::path::PathBuf;

use anyhow::{anyhow, Result};
use directories::BaseDirs;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".personal-library";
/// Library file name stored inside the application data directory.
const LIBRARY_FILE_NAME: &str = "library.json";
/// Subdirectory holding the rolling log files.
const LOG_DIR_NAME: &str = "logs";

/// Resolve the application data directory inside the user's home.
pub fn default_data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}

pub fn default_library_path() -> Result<PathBuf> {
    Ok(default_data_dir()?.join(LIBRARY_FILE_NAME))
}

pub fn default_log_dir() -> Result<PathBuf> {
    Ok(default_data_dir()?.join(LOG_DIR_NAME))
}
