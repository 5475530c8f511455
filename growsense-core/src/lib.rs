//! Core reporting pipeline for GrowSense
//!
//! Reduces periodic sensor telemetry to what a grower needs to see: the
//! latest value of each variable, a few derived indicators, threshold
//! alerts, and descriptive statistics over the queried window.
//!
//! The crate is pure. Fetching rows is left to a store connector; rendering
//! is left to whatever consumes [`Report`].
//!
//! ```text
//! resolve → build → (store) → normalize ─┬→ extract_latest → derive_metrics → classify
//!                                        ├→ summarize
//!                                        └→ extract_series
//! ```
//!
//! ```rust
//! use growsense_core::{normalize, resolve, build, Report, RawRow, SensorProfile, Thresholds};
//!
//! let resolution = resolve(15, 5);
//! let query = build(SensorProfile::Environmental, resolution.window, "grow-room");
//! assert!(query.to_flux().contains("range(start: -15d, stop: -5d)"));
//!
//! // Rows as a store would return them
//! let rows = vec![
//!     RawRow::new("2024-05-01T10:00:00Z", "temperature", 31.0),
//!     RawRow::new("2024-05-01T10:00:00Z", "humidity", 50.0),
//! ];
//! let table = normalize(vec![rows])?;
//! let report = Report::from_table(SensorProfile::Environmental, resolution, &table, &Thresholds::default())?;
//!
//! assert_eq!(report.alerts[0].message, "high temperature");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod alerts;
pub mod constants;
pub mod derived;
pub mod errors;
pub mod latest;
pub mod normalize;
pub mod profile;
pub mod query;
pub mod report;
pub mod series;
pub mod stats;
pub mod window;

// Public API
pub use alerts::{classify, AlertRecord, Severity, ThresholdBand, Thresholds};
pub use derived::{derive_metrics, DerivedMetrics};
pub use errors::{NormalizeError, NormalizeResult, SummaryError, SummaryResult, ThresholdError};
pub use latest::{extract_latest, LatestValues};
pub use normalize::{normalize, CanonicalTable, RawRow, Sample};
pub use profile::{FieldAlias, SensorProfile};
pub use query::{build, QueryDescriptor};
pub use report::Report;
pub use series::{extract_series, SeriesMap};
pub use stats::{summarize, SummaryStats, VariableStats};
pub use window::{resolve, Resolution, TimeWindow, WindowBounds};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_exists() {
        assert!(!VERSION.is_empty());
    }
}
