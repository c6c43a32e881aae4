use anyhow::Context as _;
use parkpass_core::{config::Config, paths, Store};
use std::path::{Path, PathBuf};

/// Effective configuration and database location for one invocation.
pub struct Context {
    pub config: Config,
    pub config_path: PathBuf,
    pub db_path: PathBuf,
}

impl Context {
    /// Priority for each path:
    /// 1. `--config` / `--db` flag (or their env vars)
    /// 2. `database:` in the config file (db only)
    /// 3. `~/.parkpass/`
    pub fn resolve(config: Option<&Path>, db: Option<&Path>) -> anyhow::Result<Self> {
        let config_path = match config {
            Some(p) => p.to_path_buf(),
            None => paths::default_config_path()?,
        };
        let config = Config::load_or_default(&config_path)
            .with_context(|| format!("loading {}", config_path.display()))?;
        let db_path = match db {
            Some(p) => p.to_path_buf(),
            None => config.database_path()?,
        };
        Ok(Self {
            config,
            config_path,
            db_path,
        })
    }

    pub fn open_store(&self) -> anyhow::Result<Store> {
        Store::open(&self.db_path, &self.config.fleet)
            .with_context(|| format!("opening {}", self.db_path.display()))
    }
}
