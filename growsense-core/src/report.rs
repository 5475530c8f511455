//! Report assembly
//!
//! One reporting cycle ends in a [`Report`]: a consistent snapshot of every
//! output the presentation layer renders. A report is built in full or not
//! at all.

use serde::{Deserialize, Serialize};

use crate::{
    alerts::{classify, AlertRecord, Severity, Thresholds},
    derived::{derive_metrics, DerivedMetrics},
    errors::SummaryResult,
    latest::{extract_latest, LatestValues},
    normalize::CanonicalTable,
    profile::SensorProfile,
    series::{extract_series, SeriesMap},
    stats::{summarize, SummaryStats},
    window::{Resolution, TimeWindow},
};

/// Outputs of one reporting cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Profile reported on
    pub profile: SensorProfile,
    /// Window actually queried
    pub window: TimeWindow,
    /// The requested offsets had to be reordered
    pub window_corrected: bool,
    /// Latest value per variable
    pub latest: LatestValues,
    /// Derived metrics whose inputs were present
    pub derived: DerivedMetrics,
    /// Alerts in rule order
    pub alerts: Vec<AlertRecord>,
    /// Statistics over the whole window
    pub summary: SummaryStats,
    /// Per-variable time series
    pub series: SeriesMap,
}

impl Report {
    /// Run every reduction stage over a normalized table
    pub fn from_table(
        profile: SensorProfile,
        resolution: Resolution,
        table: &CanonicalTable,
        thresholds: &Thresholds,
    ) -> SummaryResult<Self> {
        let summary = summarize(table)?;
        let latest = extract_latest(table);
        let derived = derive_metrics(profile, &latest);
        let alerts = classify(profile, &latest, &derived, thresholds);
        let series = extract_series(table);

        log::debug!(
            "{}: {} samples, {} variables, {} derived, {} alerts",
            profile,
            table.len(),
            latest.len(),
            derived.len(),
            alerts.len()
        );

        Ok(Self {
            profile,
            window: resolution.window,
            window_corrected: resolution.corrected,
            latest,
            derived,
            alerts,
            summary,
            series,
        })
    }

    /// Most severe alert level, if any alert was raised
    pub fn worst_severity(&self) -> Option<Severity> {
        self.alerts.iter().map(|a| a.severity).max()
    }
}
