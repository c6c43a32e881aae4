use crate::error::{ParkpassError, Result};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const PARKPASS_DIR: &str = ".parkpass";
pub const CONFIG_FILE: &str = "config.yaml";
pub const DB_FILE: &str = "parkpass.db";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

/// `~/.parkpass`
pub fn data_dir() -> Result<PathBuf> {
    home::home_dir()
        .map(|h| h.join(PARKPASS_DIR))
        .ok_or(ParkpassError::HomeNotFound)
}

pub fn config_path_in(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE)
}

pub fn db_path_in(dir: &Path) -> PathBuf {
    dir.join(DB_FILE)
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(config_path_in(&data_dir()?))
}

pub fn default_db_path() -> Result<PathBuf> {
    Ok(db_path_in(&data_dir()?))
}
