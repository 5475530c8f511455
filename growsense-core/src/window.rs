//! Query window resolution
//!
//! Windows are expressed in whole days before "now". The store expects
//! `start` further in the past than `stop`, so the resolver puts any pair of
//! offsets into that order.

use serde::{Deserialize, Serialize};

use crate::constants::window::{MAX_DAYS_BACK, MIN_DAYS_BACK};

/// Relative time window, in days before now
///
/// Invariant: `start > stop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    start: u32,
    stop: u32,
}

impl TimeWindow {
    /// Days back where the window begins
    pub fn start(&self) -> u32 {
        self.start
    }

    /// Days back where the window ends
    pub fn stop(&self) -> u32 {
        self.stop
    }

    /// Window length in days
    pub fn span_days(&self) -> u32 {
        self.start - self.stop
    }
}

/// Outcome of [`resolve`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// The ordered window
    pub window: TimeWindow,
    /// True when the inputs had to be reordered (or widened)
    pub corrected: bool,
}

/// Order two day offsets into a valid window
///
/// `start <= stop` is corrected by swapping. Equal offsets can't be ordered
/// by a swap, so the window is widened one day into the past. Every
/// correction is logged as a warning and flagged on the result.
pub fn resolve(start_days_back: u32, stop_days_back: u32) -> Resolution {
    if start_days_back > stop_days_back {
        return Resolution {
            window: TimeWindow { start: start_days_back, stop: stop_days_back },
            corrected: false,
        };
    }

    let window = if start_days_back == stop_days_back {
        match stop_days_back.checked_add(1) {
            Some(start) => TimeWindow { start, stop: stop_days_back },
            None => TimeWindow { start: u32::MAX, stop: u32::MAX - 1 },
        }
    } else {
        TimeWindow { start: stop_days_back, stop: start_days_back }
    };

    log::warn!(
        "start ({}d) must be further back than stop ({}d); using start={}d stop={}d",
        start_days_back, stop_days_back, window.start, window.stop
    );

    Resolution { window, corrected: true }
}

/// Inclusive bounds for the day offsets a configuration surface may offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowBounds {
    /// Smallest offset (days)
    pub min_days: u32,
    /// Largest offset (days)
    pub max_days: u32,
}

impl Default for WindowBounds {
    fn default() -> Self {
        Self {
            min_days: MIN_DAYS_BACK,
            max_days: MAX_DAYS_BACK,
        }
    }
}

impl WindowBounds {
    /// Create bounds, reordering `min`/`max` if given backwards
    pub fn new(min_days: u32, max_days: u32) -> Self {
        let (min_days, max_days) = if min_days > max_days {
            (max_days, min_days)
        } else {
            (min_days, max_days)
        };
        Self { min_days, max_days }
    }

    /// Clamp a raw offset into the bounds
    pub fn clamp(&self, days: u32) -> u32 {
        days.clamp(self.min_days, self.max_days)
    }

    /// Whether `days` lies within the bounds
    pub fn contains(&self, days: u32) -> bool {
        (self.min_days..=self.max_days).contains(&days)
    }
}
