pub mod chat;
pub mod check;
pub mod config;
pub mod orders;
pub mod parse;
pub mod request;
pub mod vehicle;

use chrono::{DateTime, FixedOffset};
use parkpass_core::clock;

/// Civil wall-clock time for terminal output.
pub(crate) fn fmt_time(ts: DateTime<FixedOffset>) -> String {
    ts.with_timezone(&clock::civil_offset())
        .format("%Y-%m-%d %H:%M")
        .to_string()
}
