use chrono::{DateTime, FixedOffset};
use rusqlite::{params, Connection, Row};
use tracing::info;

use crate::clock;
use crate::error::Result;
use crate::types::OrderRecord;

pub const DEFAULT_RECENT_LIMIT: usize = 10;

const COLUMNS: &str = "id, vehicle_name, plate, model, entry_time, created_at, response";

/// Append-only history of submission attempts, successful or not.
pub struct OrderLog<'a> {
    conn: &'a Connection,
}

struct RawOrder {
    id: i64,
    vehicle_name: String,
    plate: String,
    model: String,
    entry_time: String,
    created_at: String,
    response: Option<String>,
}

fn raw_from_row(row: &Row<'_>) -> rusqlite::Result<RawOrder> {
    Ok(RawOrder {
        id: row.get(0)?,
        vehicle_name: row.get(1)?,
        plate: row.get(2)?,
        model: row.get(3)?,
        entry_time: row.get(4)?,
        created_at: row.get(5)?,
        response: row.get(6)?,
    })
}

impl RawOrder {
    fn into_record(self) -> Result<OrderRecord> {
        Ok(OrderRecord {
            id: self.id,
            vehicle_name: self.vehicle_name,
            plate: self.plate,
            model: self.model,
            entry_time: clock::from_iso(&self.entry_time)?,
            created_at: clock::from_iso(&self.created_at)?,
            response_text: self.response.unwrap_or_default(),
        })
    }
}

impl<'a> OrderLog<'a> {
    pub(crate) fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Record an attempt. `created_at` is taken from the clock, not the caller.
    pub fn append(
        &self,
        vehicle_name: &str,
        plate: &str,
        model: &str,
        entry_time: DateTime<FixedOffset>,
        response_text: &str,
    ) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO orders (vehicle_name, plate, model, entry_time, created_at, response)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                vehicle_name,
                plate,
                model,
                clock::to_iso(entry_time),
                clock::to_iso(clock::now()),
                response_text
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        info!(id, vehicle = %vehicle_name, entry_time = %entry_time, "order recorded");
        Ok(id)
    }

    /// Orders whose entry time has not passed yet, soonest first.
    pub fn list_active(&self) -> Result<Vec<OrderRecord>> {
        self.list_active_at(clock::now())
    }

    pub fn list_active_at(&self, now: DateTime<FixedOffset>) -> Result<Vec<OrderRecord>> {
        self.query(
            &format!("SELECT {COLUMNS} FROM orders WHERE entry_time >= ?1 ORDER BY entry_time, id"),
            params![clock::to_iso(now)],
        )
    }

    /// The `limit` most recently created orders, newest first.
    pub fn list_recent(&self, limit: usize) -> Result<Vec<OrderRecord>> {
        self.query(
            &format!("SELECT {COLUMNS} FROM orders ORDER BY created_at DESC, id DESC LIMIT ?1"),
            params![limit as i64],
        )
    }

    fn query(&self, sql: &str, args: impl rusqlite::Params) -> Result<Vec<OrderRecord>> {
        let mut stmt = self.conn.prepare(sql)?;
        let raw = stmt
            .query_map(args, raw_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        raw.into_iter().map(RawOrder::into_record).collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
