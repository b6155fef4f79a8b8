//! Process-lifetime cache of enriched schedules, keyed by game date.

use crate::GameRecord;
use chrono::NaiveDate;
use log::debug;
use std::collections::HashMap;
use std::time::{Duration, Instant};

pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone)]
struct Entry {
    stored_at: Instant,
    records: Vec<GameRecord>,
}

#[derive(Debug, Clone)]
pub struct ScheduleCache {
    ttl: Duration,
    entries: HashMap<NaiveDate, Entry>,
}

impl Default for ScheduleCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl ScheduleCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entries: HashMap::new() }
    }

    /// Cached records for `date`, dropping the entry if it has expired.
    pub fn get(&mut self, date: NaiveDate) -> Option<&[GameRecord]> {
        let expired = self.entries.get(&date).is_some_and(|e| e.stored_at.elapsed() >= self.ttl);
        if expired {
            debug!("schedule cache entry for {date} expired");
            self.entries.remove(&date);
        }
        self.entries.get(&date).map(|e| e.records.as_slice())
    }

    pub fn insert(&mut self, date: NaiveDate, records: Vec<GameRecord>) {
        self.entries.insert(date, Entry { stored_at: Instant::now(), records });
    }

    pub fn invalidate(&mut self, date: NaiveDate) {
        self.entries.remove(&date);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
