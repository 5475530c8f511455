//! Error Types for Report Cycle Failures
//!
//! ## Design Philosophy
//!
//! Every error here is terminal to the current reporting cycle and never to
//! the process. A cycle that hits any of them produces no output at all, and
//! the caller is free to run the next cycle straight away.
//!
//! ## Error Categories
//!
//! ### Data Issues
//! - `EmptyResult`: The store answered, but the window holds no rows
//! - `MalformedTimestamp`: A row carries a time the normalizer can't parse
//! - `InvalidValue`: A row carries NaN or infinity
//!
//! ### Defensive
//! - `InsufficientData`: Summarizing an empty table (precluded by normalization)
//!
//! ### Configuration
//! - `ThresholdError`: Threshold overrides could not be read or parsed
//!
//! ## Error Handling Strategy
//!
//! ```rust
//! use growsense_core::{normalize, NormalizeError, RawRow};
//!
//! let batches: Vec<Vec<RawRow>> = Vec::new();
//! match normalize(batches) {
//!     Ok(table) => {
//!         // Continue the cycle with the canonical table
//!         let _ = table;
//!     }
//!     Err(NormalizeError::EmptyResult) => {
//!         // Surface "no data for selected range" and stop the cycle
//!     }
//!     Err(other) => {
//!         // Malformed store output - report and stop
//!         let _ = other;
//!     }
//! }
//! ```

use thiserror_no_std::Error;

/// Result type for normalization
pub type NormalizeResult<T> = Result<T, NormalizeError>;

/// Result type for statistical summaries
pub type SummaryResult<T> = Result<T, SummaryError>;

/// Result type for threshold loading
pub type ThresholdResult<T> = Result<T, ThresholdError>;

/// Failures while turning raw store rows into a canonical table
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizeError {
    /// Valid query, zero rows for the window/profile combination
    #[error("No data for selected range")]
    EmptyResult,

    /// Row time could not be parsed into a timestamp
    #[error("Malformed timestamp {value:?} in row {row}")]
    MalformedTimestamp {
        /// Zero-based row index across all batches
        row: usize,
        /// The raw time text as returned by the store
        value: String,
    },

    /// Row value is NaN or infinite
    #[error("Invalid value in row {row}: not a finite number")]
    InvalidValue {
        /// Zero-based row index across all batches
        row: usize,
    },
}

/// Failures while summarizing a canonical table
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryError {
    /// Nothing to summarize
    #[error("Insufficient data: need {required}, have {available}")]
    InsufficientData {
        /// Minimum number of samples needed
        required: usize,
        /// Actual number of samples available
        available: usize,
    },
}

/// Failures while loading threshold overrides
#[derive(Error, Debug)]
pub enum ThresholdError {
    /// Override file could not be read
    #[error("Failed to read thresholds: {0}")]
    Io(#[from] std::io::Error),

    /// Override document is not valid
    #[error("Invalid thresholds: {0}")]
    Parse(#[from] serde_json::Error),
}
