//! SQLite persistence for the vehicle registry and the order log.
//!
//! # Schema
//!
//! ```text
//! vehicles(id, name UNIQUE, plate, model)
//! orders(id, vehicle_name, plate, model, entry_time, created_at, response)
//! ```
//!
//! Both tables are created on open. Timestamps are ISO-8601 strings written
//! by [`crate::clock::to_iso`], so string comparison in SQL is time comparison.

use std::path::Path;

use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;
use crate::orders::OrderLog;
use crate::registry::VehicleRegistry;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS vehicles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT UNIQUE NOT NULL,
    plate TEXT NOT NULL,
    model TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS orders (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    vehicle_name TEXT NOT NULL,
    plate TEXT NOT NULL,
    model TEXT NOT NULL,
    entry_time TEXT NOT NULL,
    created_at TEXT NOT NULL,
    response TEXT
);
";

/// A vehicle inserted into an empty registry on open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedVehicle {
    pub name: String,
    pub plate: String,
    pub model: String,
}

impl SeedVehicle {
    pub fn new(name: &str, plate: &str, model: &str) -> Self {
        Self {
            name: name.to_string(),
            plate: plate.to_string(),
            model: model.to_string(),
        }
    }
}

pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open or create the database at `path`, then seed `fleet` into the
    /// vehicle table if it is empty.
    pub fn open(path: &Path, fleet: &[SeedVehicle]) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        debug!(path = %path.display(), "opening store");
        Self::init(Connection::open(path)?, fleet)
    }

    pub fn open_in_memory(fleet: &[SeedVehicle]) -> Result<Self> {
        Self::init(Connection::open_in_memory()?, fleet)
    }

    fn init(conn: Connection, fleet: &[SeedVehicle]) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        let store = Self { conn };
        store.seed(fleet)?;
        Ok(store)
    }

    fn seed(&self, fleet: &[SeedVehicle]) -> Result<()> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM vehicles", [], |row| row.get(0))?;
        if count > 0 || fleet.is_empty() {
            return Ok(());
        }
        let mut stmt = self
            .conn
            .prepare("INSERT OR IGNORE INTO vehicles (name, plate, model) VALUES (?1, ?2, ?3)")?;
        for v in fleet {
            stmt.execute(params![
                v.name.trim().to_lowercase(),
                v.plate.trim().to_uppercase(),
                v.model.trim()
            ])?;
        }
        info!(count = fleet.len(), "seeded default fleet");
        Ok(())
    }

    pub fn vehicles(&self) -> VehicleRegistry<'_> {
        VehicleRegistry::new(&self.conn)
    }

    pub fn orders(&self) -> OrderLog<'_> {
        OrderLog::new(&self.conn)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fleet() -> Vec<SeedVehicle> {
        vec![
            SeedVehicle::new("Секвойя", "а606во 797", "Тойота"),
            SeedVehicle::new("панама", "У657НУ 797", "Порше"),
        ]
    }

    #[test]
    fn seeds_empty_registry_normalised() {
        let store = Store::open_in_memory(&fleet()).unwrap();
        let all = store.vehicles().list_all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].name, "секвойя");
        assert_eq!(all[1].plate, "А606ВО 797");
    }

    #[test]
    fn empty_seed_leaves_registry_empty() {
        let store = Store::open_in_memory(&[]).unwrap();
        assert_eq!(store.vehicles().count().unwrap(), 0);
    }

    #[test]
    fn reopen_does_not_reseed_non_empty_registry() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/parkpass.db");
        {
            let store = Store::open(&path, &fleet()).unwrap();
            let v = store.vehicles().find_by_name("панама").unwrap().unwrap();
            assert!(store.vehicles().delete_by_id(v.id).unwrap());
        }
        let store = Store::open(&path, &fleet()).unwrap();
        let names: Vec<String> = store
            .vehicles()
            .list_all()
            .unwrap()
            .into_iter()
            .map(|v| v.name)
            .collect();
        assert_eq!(names, vec!["секвойя"]);
    }

    #[test]
    fn reopen_reseeds_after_registry_emptied() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("parkpass.db");
        {
            let store = Store::open(&path, &fleet()).unwrap();
            for v in store.vehicles().list_all().unwrap() {
                store.vehicles().delete_by_id(v.id).unwrap();
            }
        }
        let store = Store::open(&path, &fleet()).unwrap();
        assert_eq!(store.vehicles().count().unwrap(), 2);
    }
}
