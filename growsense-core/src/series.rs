//! Per-variable time series for charting

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::normalize::CanonicalTable;

/// Variable name to its `(time, value)` points, each series time-ordered
pub type SeriesMap = BTreeMap<String, Vec<(DateTime<Utc>, f64)>>;

/// Split `table` into one time-ordered series per variable
///
/// Points sharing a timestamp stay in store order.
pub fn extract_series(table: &CanonicalTable) -> SeriesMap {
    let mut series = SeriesMap::new();
    for sample in table {
        series
            .entry(sample.variable.clone())
            .or_default()
            .push((sample.time, sample.value));
    }
    for points in series.values_mut() {
        points.sort_by_key(|(time, _)| *time);
    }
    series
}
