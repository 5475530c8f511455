//! Constants for GrowSense Core
//!
//! Centralized, documented constants for the reporting pipeline. Numeric
//! values that drive classification live here so they can be tuned without
//! touching control flow.
//!
//! ## Organization
//!
//! - **Fields**: Measurement identifiers and field names per sensor profile
//! - **Alerts**: Default alert thresholds
//! - **Window**: Day-offset bounds for the query window
//!
//! ## Usage Guidelines
//!
//! 1. Always use these constants instead of magic numbers
//! 2. Use descriptive names that include units
//! 3. Runtime overrides go through `alerts::Thresholds`, not edits here

/// Measurement identifiers and field names queried from the store.
pub mod fields;

/// Default alert thresholds per profile and variable.
pub mod alerts;

/// Query window bounds in days.
pub mod window;

pub use alerts::{
    TEMP_HIGH_ERROR_C, TEMP_LOW_WARNING_C,
    HUMIDITY_LOW_WARNING_PCT, HUMIDITY_HIGH_WARNING_PCT,
    VIBRATION_WARNING_G,
};

pub use window::{MIN_DAYS_BACK, MAX_DAYS_BACK, DEFAULT_START_DAYS_BACK, DEFAULT_STOP_DAYS_BACK};
