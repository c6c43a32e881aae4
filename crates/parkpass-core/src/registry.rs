use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use tracing::info;

use crate::error::{ParkpassError, Result};
use crate::types::{Vehicle, VehicleId};

/// Named vehicles available for pass requests.
///
/// Names are stored lowercased and plates upper-cased. Lookups by name
/// lowercase the query in Rust because SQLite's `LOWER()` only folds ASCII.
pub struct VehicleRegistry<'a> {
    conn: &'a Connection,
}

fn from_row(row: &Row<'_>) -> rusqlite::Result<Vehicle> {
    Ok(Vehicle {
        id: row.get(0)?,
        name: row.get(1)?,
        plate: row.get(2)?,
        model: row.get(3)?,
    })
}

impl<'a> VehicleRegistry<'a> {
    pub(crate) fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// All vehicles ordered by name.
    pub fn list_all(&self) -> Result<Vec<Vehicle>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, plate, model FROM vehicles ORDER BY name")?;
        let rows = stmt.query_map([], from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn count(&self) -> Result<usize> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM vehicles", [], |row| row.get(0))?;
        Ok(n as usize)
    }

    pub fn find_by_name(&self, name: &str) -> Result<Option<Vehicle>> {
        let name = name.trim().to_lowercase();
        Ok(self
            .conn
            .query_row(
                "SELECT id, name, plate, model FROM vehicles WHERE name = ?1",
                params![name],
                from_row,
            )
            .optional()?)
    }

    pub fn find_by_id(&self, id: VehicleId) -> Result<Option<Vehicle>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, name, plate, model FROM vehicles WHERE id = ?1",
                params![id],
                from_row,
            )
            .optional()?)
    }

    /// Register a vehicle. Fails with `DuplicateVehicle` when the name is
    /// already taken in any letter case.
    pub fn add(&self, name: &str, plate: &str, model: &str) -> Result<Vehicle> {
        let name = name.trim().to_lowercase();
        let plate = plate.trim().to_uppercase();
        let model = model.trim().to_string();

        if name.is_empty() {
            return Err(ParkpassError::InvalidVehicle("name is empty".into()));
        }
        if plate.is_empty() {
            return Err(ParkpassError::InvalidVehicle(format!("{name}: plate is empty")));
        }
        if model.is_empty() {
            return Err(ParkpassError::InvalidVehicle(format!("{name}: model is empty")));
        }
        if self.find_by_name(&name)?.is_some() {
            return Err(ParkpassError::DuplicateVehicle(name));
        }

        let inserted = self.conn.execute(
            "INSERT INTO vehicles (name, plate, model) VALUES (?1, ?2, ?3)",
            params![name, plate, model],
        );
        match inserted {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                return Err(ParkpassError::DuplicateVehicle(name));
            }
            Err(e) => return Err(e.into()),
        }

        let id = self.conn.last_insert_rowid();
        info!(id, name = %name, plate = %plate, "vehicle added");
        Ok(Vehicle {
            id,
            name,
            plate,
            model,
        })
    }

    /// Returns `true` if a vehicle was removed.
    pub fn delete_by_id(&self, id: VehicleId) -> Result<bool> {
        let n = self
            .conn
            .execute("DELETE FROM vehicles WHERE id = ?1", params![id])?;
        if n > 0 {
            info!(id, "vehicle deleted");
        }
        Ok(n > 0)
    }

    /// Returns `true` if a vehicle was removed.
    pub fn delete_by_name(&self, name: &str) -> Result<bool> {
        let name = name.trim().to_lowercase();
        let n = self
            .conn
            .execute("DELETE FROM vehicles WHERE name = ?1", params![name])?;
        if n > 0 {
            info!(name = %name, "vehicle deleted");
        }
        Ok(n > 0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use crate::error::ParkpassError;
    use crate::store::Store;

    fn empty() -> Store {
        Store::open_in_memory(&[]).unwrap()
    }

    #[test]
    fn add_normalises_name_and_plate() {
        let store = empty();
        let v = store.vehicles().add("Пример", "а123вс777", "Тест").unwrap();
        assert_eq!(v.name, "пример");
        assert_eq!(v.plate, "А123ВС777");
        assert_eq!(v.model, "Тест");

        let all = store.vehicles().list_all().unwrap();
        assert_eq!(all, vec![v]);
    }

    #[test]
    fn duplicate_name_in_other_case_is_rejected() {
        let store = empty();
        store.vehicles().add("пример", "А123ВС777", "Тест").unwrap();
        let err = store
            .vehicles()
            .add("ПРИМЕР", "В456ОР99", "Другая")
            .unwrap_err();
        assert!(matches!(err, ParkpassError::DuplicateVehicle(ref n) if n == "пример"));

        let all = store.vehicles().list_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].plate, "А123ВС777");
    }

    #[test]
    fn find_by_name_is_case_insensitive() {
        let store = empty();
        let v = store.vehicles().add("секвойя", "А606ВО 797", "Тойота").unwrap();
        for query in ["секвойя", "СЕКВОЙЯ", "  Секвойя "] {
            assert_eq!(
                store.vehicles().find_by_name(query).unwrap().as_ref(),
                Some(&v),
                "{query}"
            );
        }
        assert!(store.vehicles().find_by_name("панама").unwrap().is_none());
    }

    #[test]
    fn find_by_id() {
        let store = empty();
        let v = store.vehicles().add("панама", "У657НУ 797", "Порше").unwrap();
        assert_eq!(store.vehicles().find_by_id(v.id).unwrap(), Some(v.clone()));
        assert_eq!(store.vehicles().find_by_id(v.id + 100).unwrap(), None);
    }

    #[test]
    fn list_all_is_ordered_by_name() {
        let store = empty();
        for name in ["паджеро", "секвойя", "панама"] {
            store.vehicles().add(name, "К860НК 150", "М").unwrap();
        }
        let names: Vec<String> = store
            .vehicles()
            .list_all()
            .unwrap()
            .into_iter()
            .map(|v| v.name)
            .collect();
        assert_eq!(names, vec!["паджеро", "панама", "секвойя"]);
    }

    #[test]
    fn delete_reports_whether_a_row_existed() {
        let store = empty();
        let v = store.vehicles().add("паджеро", "К860НК 150", "Митсубиси").unwrap();
        assert!(store.vehicles().delete_by_id(v.id).unwrap());
        assert!(!store.vehicles().delete_by_id(v.id).unwrap());

        store.vehicles().add("панама", "У657НУ 797", "Порше").unwrap();
        assert!(store.vehicles().delete_by_name("ПАНАМА").unwrap());
        assert!(!store.vehicles().delete_by_name("панама").unwrap());
        assert_eq!(store.vehicles().count().unwrap(), 0);
    }

    #[test]
    fn blank_fields_are_rejected() {
        let store = empty();
        for (name, plate, model) in [(" ", "А1", "М"), ("x", "", "М"), ("x", "А1", "  ")] {
            assert!(matches!(
                store.vehicles().add(name, plate, model),
                Err(ParkpassError::InvalidVehicle(_))
            ));
        }
        assert_eq!(store.vehicles().count().unwrap(), 0);
    }
}
