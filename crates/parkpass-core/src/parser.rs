//! Free-text request parsing: an optional vehicle name followed by an entry
//! time such as `15:30`, `15.30`, `1530` or `завтра 10:00`.

use std::sync::OnceLock;

use chrono::{DateTime, FixedOffset};
use regex::Regex;

use crate::clock;
use crate::types::{ParsedMessage, Vehicle};

/// Words that move the target date to the next civil day.
pub const TOMORROW_KEYWORDS: &[&str] = &["завтра", "tomorrow"];

// ---------------------------------------------------------------------------
// Time patterns
// ---------------------------------------------------------------------------

static DOTTED_RE: OnceLock<Regex> = OnceLock::new();
static COMPACT_RE: OnceLock<Regex> = OnceLock::new();

/// Tried in this order; the first one that yields a valid time wins.
fn time_patterns() -> [&'static Regex; 2] {
    [
        DOTTED_RE.get_or_init(|| Regex::new(r"([0-9]{1,2})[:.]([0-9]{2})").unwrap()),
        COMPACT_RE.get_or_init(|| Regex::new(r"^([0-9]{2})([0-9]{2})$").unwrap()),
    ]
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Parse the time part of a message relative to `now`.
///
/// Returns `None` when no pattern produces an hour in 0..=23 and a minute in
/// 0..=59. Only the first match of each pattern is considered.
pub fn parse_time(text: &str, now: DateTime<FixedOffset>) -> Option<DateTime<FixedOffset>> {
    let mut text = text.trim().to_lowercase();
    let today = now.with_timezone(&clock::civil_offset()).date_naive();

    let mut tomorrow = false;
    for keyword in TOMORROW_KEYWORDS {
        if text.contains(keyword) {
            tomorrow = true;
            text = text.replace(keyword, "");
        }
    }
    let text = text.trim();
    let target = if tomorrow { today.succ_opt()? } else { today };

    for re in time_patterns() {
        let Some(caps) = re.captures(text) else {
            continue;
        };
        let (Ok(hour), Ok(minute)) = (caps[1].parse::<u32>(), caps[2].parse::<u32>()) else {
            continue;
        };
        if hour <= 23 && minute <= 59 {
            let naive = target.and_hms_opt(hour, minute, 0)?;
            return Some(clock::civil(naive));
        }
    }
    None
}

/// Parse a whole message against a registry snapshot.
///
/// Vehicles are tried in name order and the first name that is a prefix of
/// the message is taken. The name is removed before the time is parsed, so
/// digits inside a vehicle name never leak into the time.
pub fn parse_message(text: &str, vehicles: &[Vehicle], now: DateTime<FixedOffset>) -> ParsedMessage {
    let text = text.trim().to_lowercase();

    let mut sorted: Vec<&Vehicle> = vehicles.iter().collect();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));

    let mut rest = text.as_str();
    let mut vehicle = None;
    for candidate in sorted {
        let name = candidate.name.to_lowercase();
        if name.is_empty() {
            continue;
        }
        if let Some(stripped) = rest.strip_prefix(name.as_str()) {
            vehicle = Some(name);
            rest = stripped.trim();
            break;
        }
    }

    ParsedMessage {
        vehicle,
        entry_time: parse_time(rest, now),
    }
}

/// [`parse_message`] against the current civil time.
pub fn parse_message_now(text: &str, vehicles: &[Vehicle]) -> ParsedMessage {
    parse_message(text, vehicles, clock::now())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
