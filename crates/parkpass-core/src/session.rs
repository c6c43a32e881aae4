//! Per-user state for a parsed time that is waiting for a vehicle pick.
//!
//! Expiry policy: with no TTL (the default) an entry stays until it is taken
//! or the process exits. With a TTL, an entry older than the TTL is treated
//! as absent and dropped on the next `take` or `purge_expired`.

use std::collections::HashMap;

use chrono::{DateTime, Duration, FixedOffset};

pub type UserId = i64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEntry {
    pub entry_time: DateTime<FixedOffset>,
    pub created_at: DateTime<FixedOffset>,
}

#[derive(Debug, Default)]
pub struct PendingSelections {
    entries: HashMap<UserId, PendingEntry>,
    ttl: Option<Duration>,
}

impl PendingSelections {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    fn is_expired(&self, entry: &PendingEntry, now: DateTime<FixedOffset>) -> bool {
        self.ttl.is_some_and(|ttl| now - entry.created_at > ttl)
    }

    /// Replaces any earlier pending time for the same user.
    pub fn insert(&mut self, user: UserId, entry_time: DateTime<FixedOffset>, now: DateTime<FixedOffset>) {
        self.entries.insert(
            user,
            PendingEntry {
                entry_time,
                created_at: now,
            },
        );
    }

    pub fn peek(&self, user: UserId, now: DateTime<FixedOffset>) -> Option<&PendingEntry> {
        self.entries
            .get(&user)
            .filter(|entry| !self.is_expired(entry, now))
    }

    /// Remove and return the user's pending time, if it has not expired.
    pub fn take(&mut self, user: UserId, now: DateTime<FixedOffset>) -> Option<DateTime<FixedOffset>> {
        let entry = self.entries.remove(&user)?;
        if self.is_expired(&entry, now) {
            return None;
        }
        Some(entry.entry_time)
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&mut self, now: DateTime<FixedOffset>) -> usize {
        let Some(ttl) = self.ttl else {
            return 0;
        };
        let before = self.entries.len();
        self.entries.retain(|_, entry| now - entry.created_at <= ttl);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
