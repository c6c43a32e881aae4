use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParkpassError {
    #[error("could not recognise an entry time in: {0}")]
    ParseFailure(String),

    #[error("vehicle not found: {0}")]
    VehicleNotFound(String),

    #[error("vehicle already exists: {0}")]
    DuplicateVehicle(String),

    #[error("invalid vehicle: {0}")]
    InvalidVehicle(String),

    #[error("invalid timestamp '{0}'")]
    InvalidTimestamp(String),

    #[error("could not write config {}: {source}", path.display())]
    ConfigWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("home directory not found: set HOME environment variable")]
    HomeNotFound,

    #[error(transparent)]
    Db(#[from] rusqlite::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ParkpassError>;
