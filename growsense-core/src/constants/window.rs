//! Query Window Bounds
//!
//! The configuration surface offers whole days back from "now".

/// Smallest selectable offset (days).
pub const MIN_DAYS_BACK: u32 = 1;

/// Largest selectable offset (days).
pub const MAX_DAYS_BACK: u32 = 15;

/// Default window start (days back).
pub const DEFAULT_START_DAYS_BACK: u32 = 15;

/// Default window stop (days back).
pub const DEFAULT_STOP_DAYS_BACK: u32 = 5;
