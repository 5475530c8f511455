//! Latest-value extraction
//!
//! Reduces a canonical table to the most recent observation per variable.
//!
//! The tie-break is part of the contract: samples are stable-sorted by time,
//! so among samples sharing the maximum timestamp the one that came later in
//! store order wins.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::normalize::{CanonicalTable, Sample};

/// Most recent observation of one variable
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatestSample {
    /// When it was observed
    pub time: DateTime<Utc>,
    /// Observed value
    pub value: f64,
}

/// Variable name to its value at the maximum timestamp
///
/// Iterates in variable-name order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LatestValues {
    entries: BTreeMap<String, LatestSample>,
}

impl LatestValues {
    /// Latest value of `variable`, if it was observed
    pub fn get(&self, variable: &str) -> Option<f64> {
        self.entries.get(variable).map(|s| s.value)
    }

    /// Latest value and its timestamp
    pub fn sample(&self, variable: &str) -> Option<&LatestSample> {
        self.entries.get(variable)
    }

    /// Whether `variable` was observed
    pub fn contains(&self, variable: &str) -> bool {
        self.entries.contains_key(variable)
    }

    /// Number of variables
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing was observed
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(variable, value)` pairs in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.entries.iter().map(|(k, s)| (k.as_str(), s.value))
    }

    /// One sample per variable, usable as input to [`extract_latest`] again
    pub fn to_table(&self) -> CanonicalTable {
        CanonicalTable::from_samples(
            self.entries
                .iter()
                .map(|(variable, s)| Sample {
                    time: s.time,
                    variable: variable.clone(),
                    value: s.value,
                })
                .collect(),
        )
    }
}

/// Reduce `table` to one value per variable
pub fn extract_latest(table: &CanonicalTable) -> LatestValues {
    let mut ordered: Vec<&Sample> = table.iter().collect();
    // sort_by_key is stable; equal times keep store order
    ordered.sort_by_key(|s| s.time);

    let mut entries = BTreeMap::new();
    for sample in ordered {
        entries.insert(
            sample.variable.clone(),
            LatestSample { time: sample.time, value: sample.value },
        );
    }

    LatestValues { entries }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 10, minute, 0).unwrap()
    }

    fn table(entries: &[(u32, &str, f64)]) -> CanonicalTable {
        CanonicalTable::from_samples(
            entries.iter()
                .map(|(m, v, x)| Sample { time: at(*m), variable: v.to_string(), value: *x })
                .collect(),
        )
    }

    #[test]
    fn picks_maximum_timestamp_regardless_of_order() {
        let latest = extract_latest(&table(&[
            (5, "temperature", 22.0),
            (9, "temperature", 35.0),
            (1, "temperature", 18.0),
            (3, "humidity", 45.0),
        ]));

        assert_eq!(latest.get("temperature"), Some(35.0));
        assert_eq!(latest.get("humidity"), Some(45.0));
        assert_eq!(latest.sample("temperature").unwrap().time, at(9));
        assert_eq!(latest.len(), 2);
    }

    #[test]
    fn equal_timestamps_later_input_wins() {
        let latest = extract_latest(&table(&[
            (4, "humidity", 60.0),
            (4, "humidity", 61.0),
            (2, "humidity", 99.0),
        ]));
        assert_eq!(latest.get("humidity"), Some(61.0));
    }

    #[test]
    fn absent_variables_are_absent() {
        let latest = extract_latest(&table(&[(0, "accel_x", 0.1)]));
        assert!(latest.get("accel_y").is_none());
        assert!(!latest.contains("accel_z"));
    }

    #[test]
    fn zero_is_a_value_not_absence() {
        let latest = extract_latest(&table(&[(0, "accel_z", 0.0)]));
        assert_eq!(latest.get("accel_z"), Some(0.0));
    }

    fn arb_table() -> impl Strategy<Value = CanonicalTable> {
        let var = prop::sample::select(vec!["temperature", "humidity", "accel_x"]);
        prop::collection::vec((0u32..30, var, -50.0f64..50.0), 1..40)
            .prop_map(|rows| {
                CanonicalTable::from_samples(
                    rows.into_iter()
                        .map(|(m, v, x)| Sample { time: at(m), variable: v.to_string(), value: x })
                        .collect(),
                )
            })
    }

    proptest! {
        #[test]
        fn extraction_is_idempotent(table in arb_table()) {
            let once = extract_latest(&table);
            let twice = extract_latest(&once.to_table());
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn every_variable_gets_one_entry(table in arb_table()) {
            let latest = extract_latest(&table);
            let names: Vec<&str> = latest.iter().map(|(k, _)| k).collect();
            prop_assert_eq!(names, table.variables());
        }

        #[test]
        fn tie_break_prefers_last_in_input(first in -10.0f64..10.0, second in -10.0f64..10.0) {
            let latest = extract_latest(&table(&[(7, "gyro_x", first), (7, "gyro_x", second)]));
            prop_assert_eq!(latest.get("gyro_x"), Some(second));
        }
    }
}
