//! Store Connectors for GrowSense Report Cycles
//!
//! ## Overview
//!
//! `growsense-core` is pure: it builds queries and reduces rows but never
//! talks to anything. This crate supplies the other half. It defines the
//! [`Store`] seam, ships an InfluxDB client behind it, and runs complete
//! reporting cycles against any store.
//!
//! ## Stores
//!
//! ### InfluxDB (feature `influx`, default)
//!
//! Flux queries over the v2 HTTP API, answered as CSV. Each Flux table in
//! the answer becomes one result batch.
//!
//! **Characteristics:**
//! - Blocking, one request per cycle
//! - Request timeout from configuration, no automatic retry
//! - Token or basic authentication
//!
//! ### Memory
//!
//! Rows held in memory, filtered the same way the query filters them. Used
//! for tests, demos and replaying captured data.
//!
//! ## Cycles
//!
//! [`run_cycle`] executes resolve → build → fetch → normalize → reduce and
//! returns either a complete [`Report`](growsense_core::Report) or a
//! [`CycleError`]. Nothing partial ever escapes. Cycles keep no state, so
//! the next one can run right after a failure.
//!
//! With the `poll` feature, [`poll::Poller`] repeats cycles on a fixed
//! interval, one blocking task per tick.
//!
//! ## Security Considerations
//!
//! 1. Never hard-code credentials; use [`StoreConfig::from_env`]
//! 2. Use HTTPS outside the local network
//! 3. Give the token read access to the one bucket only
//!
//! ## Example Usage
//!
//! ```rust
//! use growsense_connectors::{run_cycle, CycleRequest, MemoryStore};
//! use growsense_core::{RawRow, SensorProfile, Thresholds};
//!
//! let now = chrono::Utc::now();
//! let recent = (now - chrono::Duration::days(6)).to_rfc3339();
//!
//! let store = MemoryStore::new("grow-room")
//!     .with_now(now)
//!     .with_rows(vec![
//!         RawRow::new(recent.clone(), "temperature", 31.0).with_measurement("studio-dht22"),
//!         RawRow::new(recent, "humidity", 50.0).with_measurement("studio-dht22"),
//!     ]);
//!
//! let request = CycleRequest::new(SensorProfile::Environmental, 15, 5);
//! let report = run_cycle(&store, &request, &Thresholds::default())?;
//! assert_eq!(report.alerts[0].message, "high temperature");
//! # Ok::<(), growsense_connectors::CycleError>(())
//! ```

pub mod config;
pub mod cycle;
pub mod memory;

#[cfg(feature = "influx")]
pub mod influx;

#[cfg(feature = "poll")]
pub mod poll;

pub use config::{AuthMethod, StoreConfig};
pub use cycle::{run_cycle, CycleError, CycleRequest};
pub use memory::MemoryStore;

#[cfg(feature = "influx")]
pub use influx::InfluxStore;

use growsense_core::{QueryDescriptor, RawRow};
use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Rows as returned by one store query, possibly in several batches
pub type Batches = Vec<Vec<RawRow>>;

/// Store failures. Each one aborts the current cycle.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Network or transport failure
    #[error("Request failed: {0}")]
    Request(String),

    /// Credentials rejected
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Store returned an error status
    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    /// Store accepted the request but reported a query error
    #[error("Query error: {0}")]
    Query(String),

    /// Answer could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// A queryable time-series store
///
/// Implementations are passed explicitly into each cycle; there is no
/// global client.
pub trait Store {
    /// Bucket or source identifier queries run against
    fn source(&self) -> &str;

    /// Run `query`, returning its rows in one or more batches
    fn query(&self, query: &QueryDescriptor) -> StoreResult<Batches>;

    /// Query statistics so far
    fn stats(&self) -> QueryStats {
        QueryStats::default()
    }
}

impl<S: Store + ?Sized> Store for &S {
    fn source(&self) -> &str {
        (**self).source()
    }

    fn query(&self, query: &QueryDescriptor) -> StoreResult<Batches> {
        (**self).query(query)
    }

    fn stats(&self) -> QueryStats {
        (**self).stats()
    }
}

/// Query statistics common to all stores
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct QueryStats {
    /// Queries answered successfully
    pub queries_ok: u64,
    /// Queries that failed
    pub queries_failed: u64,
    /// Rows received across all queries
    pub rows_received: u64,
    /// Last error message
    pub last_error: Option<String>,
}

impl QueryStats {
    pub(crate) fn record(&mut self, outcome: &StoreResult<Batches>) {
        match outcome {
            Ok(batches) => {
                self.queries_ok += 1;
                self.rows_received += batches.iter().map(|b| b.len() as u64).sum::<u64>();
            }
            Err(err) => {
                self.queries_failed += 1;
                self.last_error = Some(err.to_string());
            }
        }
    }
}
