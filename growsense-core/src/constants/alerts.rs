//! Default Alert Thresholds
//!
//! Thresholds for a home grow setup. Override at runtime through
//! [`Thresholds`](crate::alerts::Thresholds) rather than editing these.

// ===== TEMPERATURE =====

/// Above this air temperature the crop is heat stressed (°C).
///
/// Classified as an error.
pub const TEMP_HIGH_ERROR_C: f64 = 30.0;

/// Below this air temperature growth slows down (°C).
pub const TEMP_LOW_WARNING_C: f64 = 15.0;

// ===== HUMIDITY =====

/// Below this relative humidity the substrate may dry out (%).
pub const HUMIDITY_LOW_WARNING_PCT: f64 = 40.0;

/// Above this relative humidity mold becomes likely (%).
pub const HUMIDITY_HIGH_WARNING_PCT: f64 = 80.0;

// ===== VIBRATION =====

/// Acceleration magnitude above which movement is considered unusual (g).
///
/// At rest the sensor reads ~1 g from gravity alone.
pub const VIBRATION_WARNING_G: f64 = 2.0;
