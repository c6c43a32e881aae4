use crate::adapter::{DEFAULT_SITE_URL, DEFAULT_SUBMIT_PATH};
use crate::error::{ParkpassError, Result};
use crate::paths;
use crate::store::SeedVehicle;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

fn default_site_url() -> String {
    DEFAULT_SITE_URL.to_string()
}

fn default_submit_path() -> String {
    DEFAULT_SUBMIT_PATH.to_string()
}

fn default_request_timeout() -> u64 {
    10
}

fn default_check_timeout() -> u64 {
    5
}

fn default_vehicle() -> Option<String> {
    Some("секвойя".to_string())
}

pub fn default_fleet() -> Vec<SeedVehicle> {
    vec![
        SeedVehicle::new("секвойя", "А606ВО 797", "Тойота"),
        SeedVehicle::new("панама", "У657НУ 797", "Порше"),
        SeedVehicle::new("паджеро", "К860НК 150", "Митсубиси"),
    ]
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_site_url")]
    pub site_url: String,
    #[serde(default = "default_submit_path")]
    pub submit_path: String,
    /// Per-phase timeout for the landing GET and the form POST.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_check_timeout")]
    pub check_timeout_secs: u64,
    /// Used when a message names no known vehicle. `None` makes the bot ask.
    #[serde(default = "default_vehicle")]
    pub default_vehicle: Option<String>,
    /// Pending vehicle selections older than this are dropped. Unset means
    /// they live until consumed or the process exits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_ttl_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,
    /// Inserted whenever the vehicle table is empty on open.
    #[serde(default = "default_fleet")]
    pub fleet: Vec<SeedVehicle>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site_url: default_site_url(),
            submit_path: default_submit_path(),
            request_timeout_secs: default_request_timeout(),
            check_timeout_secs: default_check_timeout(),
            default_vehicle: default_vehicle(),
            pending_ttl_minutes: None,
            database: None,
            fleet: default_fleet(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    /// Like [`Config::load`] but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        write_replacing(path, data.as_bytes()).map_err(|source| ParkpassError::ConfigWrite {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Database location: the configured path, else `~/.parkpass/parkpass.db`.
    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.database {
            Some(p) => Ok(p.clone()),
            None => paths::default_db_path(),
        }
    }

    pub fn pending_ttl(&self) -> Option<chrono::Duration> {
        self.pending_ttl_minutes
            .map(|m| chrono::Duration::minutes(i64::from(m)))
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.site_url.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "site_url is empty".to_string(),
            });
        } else if !self.site_url.starts_with("http://") && !self.site_url.starts_with("https://") {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!("site_url '{}' is not an http(s) URL", self.site_url),
            });
        }

        for (name, secs) in [
            ("request_timeout_secs", self.request_timeout_secs),
            ("check_timeout_secs", self.check_timeout_secs),
        ] {
            if secs == 0 {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("{name} is 0: every request will time out"),
                });
            }
        }

        if let Some(name) = &self.default_vehicle {
            let known = self
                .fleet
                .iter()
                .any(|v| v.name.trim().to_lowercase() == name.trim().to_lowercase());
            if !known {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!(
                        "default_vehicle '{name}' is not in the seed fleet; it must be added by hand"
                    ),
                });
            }
        }

        let mut seen = std::collections::HashSet::new();
        for v in &self.fleet {
            if !seen.insert(v.name.trim().to_lowercase()) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("fleet lists '{}' more than once", v.name),
                });
            }
        }

        warnings
    }
}

/// Write through a temp file in the target directory, then rename it into
/// place, so a reader never sees a half-written config.
fn write_replacing(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;
    let mut tmp = tempfile::Builder::new()
        .prefix(".config-")
        .tempfile_in(dir)?;
    tmp.write_all(data)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
