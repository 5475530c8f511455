//! In-memory store
//!
//! Answers queries from rows it already holds, applying the same predicates
//! a real store would: measurement, field set, and the relative time range.
//! Rows come back as one batch per field, like a Flux result.

use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use growsense_core::normalize::parse_timestamp;
use growsense_core::{QueryDescriptor, RawRow};

use crate::{Batches, QueryStats, Store, StoreResult};

/// Store backed by a vector of rows
#[derive(Debug)]
pub struct MemoryStore {
    source: String,
    rows: Vec<RawRow>,
    now: Option<DateTime<Utc>>,
    stats: Mutex<QueryStats>,
}

impl MemoryStore {
    /// Empty store answering for `source`
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            rows: Vec::new(),
            now: None,
            stats: Mutex::new(QueryStats::default()),
        }
    }

    /// Replace the held rows
    pub fn with_rows(mut self, rows: Vec<RawRow>) -> Self {
        self.rows = rows;
        self
    }

    /// Pin "now" for range filtering (defaults to the wall clock)
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    /// Add one row
    pub fn push(&mut self, row: RawRow) {
        self.rows.push(row);
    }
}

/// `now` minus `days`, `None` when that falls before the representable range
fn days_before(now: DateTime<Utc>, days: u32) -> Option<DateTime<Utc>> {
    Duration::try_days(i64::from(days)).and_then(|d| now.checked_sub_signed(d))
}

/// Absolute form of a relative query range
struct Range {
    /// `None`: reaches back past the earliest representable instant
    start: Option<DateTime<Utc>>,
    /// `None`: the whole range lies before the earliest representable instant
    stop: Option<DateTime<Utc>>,
}

impl Range {
    fn new(query: &QueryDescriptor, now: DateTime<Utc>) -> Self {
        Self {
            start: days_before(now, query.range_start_days),
            stop: days_before(now, query.range_stop_days),
        }
    }

    fn contains(&self, row: &RawRow) -> bool {
        // Unparsable times are passed through for the normalizer to reject
        let Some(time) = parse_timestamp(&row.time) else {
            return true;
        };
        let Some(stop) = self.stop else {
            return false;
        };
        self.start.map_or(true, |start| time >= start) && time < stop
    }
}

impl Store for MemoryStore {
    fn source(&self) -> &str {
        &self.source
    }

    fn query(&self, query: &QueryDescriptor) -> StoreResult<Batches> {
        let range = Range::new(query, self.now.unwrap_or_else(Utc::now));

        let mut batches: Batches = Vec::new();
        for field in query.store_fields() {
            let batch: Vec<RawRow> = self
                .rows
                .iter()
                .filter(|row| row.field == field)
                .filter(|row| {
                    row.measurement
                        .as_deref()
                        .map_or(true, |m| query.matches(m, &row.field))
                })
                .filter(|row| range.contains(row))
                .cloned()
                .collect();
            if !batch.is_empty() {
                batches.push(batch);
            }
        }

        let outcome = Ok(batches);
        if let Ok(mut stats) = self.stats.lock() {
            stats.record(&outcome);
        }
        outcome
    }

    fn stats(&self) -> QueryStats {
        self.stats.lock().map(|s| s.clone()).unwrap_or_default()
    }
}
