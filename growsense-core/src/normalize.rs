//! Result normalization
//!
//! Stores hand back rows in whatever shape they like, sometimes split into
//! several batches. The normalizer projects them down to
//! `{time, variable, value}`, parses timestamps, and refuses to produce a
//! table it can't fully trust.
//!
//! Policy on bad rows: a single malformed timestamp or non-finite value
//! fails the whole normalization. A partial table would let the latest-value
//! and alert stages report on data that silently lost rows.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{NormalizeError, NormalizeResult};

/// Row as returned by a store, before normalization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    /// Time as text (RFC 3339 expected)
    pub time: String,
    /// Field name
    pub field: String,
    /// Sample value
    pub value: f64,
    /// Measurement tag, when the store reports it
    #[serde(default)]
    pub measurement: Option<String>,
}

impl RawRow {
    /// Row without a measurement tag
    pub fn new(time: impl Into<String>, field: impl Into<String>, value: f64) -> Self {
        Self {
            time: time.into(),
            field: field.into(),
            value,
            measurement: None,
        }
    }

    /// Attach the measurement tag
    pub fn with_measurement(mut self, measurement: impl Into<String>) -> Self {
        self.measurement = Some(measurement.into());
        self
    }
}

/// Single observation of one variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Observation time (UTC)
    pub time: DateTime<Utc>,
    /// Field name
    pub variable: String,
    /// Observed value
    pub value: f64,
}

/// Normalized sample sequence for one cycle
///
/// Keeps store order. Duplicate `(time, variable)` pairs are allowed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalTable {
    samples: Vec<Sample>,
}

impl CanonicalTable {
    /// Wrap already-normalized samples
    pub fn from_samples(samples: Vec<Sample>) -> Self {
        Self { samples }
    }

    /// Samples in store order
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True when there are no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Distinct variable names, sorted
    pub fn variables(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.samples.iter().map(|s| s.variable.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Iterate samples
    pub fn iter(&self) -> core::slice::Iter<'_, Sample> {
        self.samples.iter()
    }

    /// Take the samples out
    pub fn into_samples(self) -> Vec<Sample> {
        self.samples
    }
}

impl<'a> IntoIterator for &'a CanonicalTable {
    type Item = &'a Sample;
    type IntoIter = core::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

/// Normalize one or more result batches into a canonical table
///
/// Batches are concatenated in the order given. Fails with
/// [`NormalizeError::EmptyResult`] when there are no rows at all.
pub fn normalize<B>(batches: B) -> NormalizeResult<CanonicalTable>
where
    B: IntoIterator,
    B::Item: IntoIterator<Item = RawRow>,
{
    let mut samples = Vec::new();

    for row in batches.into_iter().flatten() {
        let index = samples.len();
        let time = parse_timestamp(&row.time).ok_or_else(|| NormalizeError::MalformedTimestamp {
            row: index,
            value: row.time.clone(),
        })?;

        if !row.value.is_finite() {
            return Err(NormalizeError::InvalidValue { row: index });
        }

        samples.push(Sample {
            time,
            variable: row.field,
            value: row.value,
        });
    }

    if samples.is_empty() {
        return Err(NormalizeError::EmptyResult);
    }

    log::debug!("normalized {} rows", samples.len());
    Ok(CanonicalTable { samples })
}

/// Parse a store timestamp into UTC
///
/// RFC 3339 with any offset, or a naive `YYYY-MM-DD HH:MM:SS[.f]` taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}
