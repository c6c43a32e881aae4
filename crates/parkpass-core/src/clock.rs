//! The fixed civil timezone used for every "now" and "tomorrow".
//!
//! All timestamps are kept as `DateTime<FixedOffset>` at UTC+3, independent
//! of the host's local zone.

use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, TimeZone, Utc};

use crate::error::{ParkpassError, Result};

pub const CIVIL_UTC_OFFSET_HOURS: i32 = 3;

/// Storage format. Fixed width, so lexical order equals time order as long
/// as every value is written at the civil offset.
const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%:z";

pub fn civil_offset() -> FixedOffset {
    FixedOffset::east_opt(CIVIL_UTC_OFFSET_HOURS * 3600).expect("offset within ±24h")
}

pub fn now() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&civil_offset())
}

/// Interpret a wall-clock time in the civil zone.
pub fn civil(naive: NaiveDateTime) -> DateTime<FixedOffset> {
    // A fixed offset has no gaps or folds, so the mapping is always unique.
    let offset = civil_offset();
    let utc = naive - Duration::seconds(i64::from(offset.local_minus_utc()));
    offset.from_utc_datetime(&utc)
}

pub fn to_iso(ts: DateTime<FixedOffset>) -> String {
    ts.with_timezone(&civil_offset()).format(ISO_FORMAT).to_string()
}

pub fn from_iso(s: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(s)
        .map(|ts| ts.with_timezone(&civil_offset()))
        .map_err(|_| ParkpassError::InvalidTimestamp(s.to_string()))
}
