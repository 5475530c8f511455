//! Reporting cycle
//!
//! One cycle: resolve the window, build the query, fetch, normalize, reduce.
//! Either a complete [`Report`] comes out or a [`CycleError`] does. Cycles
//! share nothing, so a failed one never affects the next.

use growsense_core::{
    build, normalize, resolve, NormalizeError, Report, SensorProfile, SummaryError, Thresholds,
};
use thiserror::Error;

use crate::{Store, StoreError};

/// What one cycle should report on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleRequest {
    /// Sensor profile
    pub profile: SensorProfile,
    /// Window start, days back
    pub start_days_back: u32,
    /// Window stop, days back
    pub stop_days_back: u32,
}

impl CycleRequest {
    /// Create a request
    pub fn new(profile: SensorProfile, start_days_back: u32, stop_days_back: u32) -> Self {
        Self { profile, start_days_back, stop_days_back }
    }
}

/// Why a cycle produced no report
#[derive(Debug, Error)]
pub enum CycleError {
    /// The store could not answer
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The answer could not be normalized (including "no data")
    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    /// The table could not be summarized
    #[error(transparent)]
    Summary(#[from] SummaryError),

    /// The cycle stopped before producing an outcome (its task panicked or
    /// was cancelled)
    #[error("Cycle interrupted: {0}")]
    Interrupted(String),
}

impl CycleError {
    /// The window simply held no data; show "no data for selected range"
    pub fn is_no_data(&self) -> bool {
        matches!(self, CycleError::Normalize(NormalizeError::EmptyResult))
    }
}

/// Run one reporting cycle against `store`
pub fn run_cycle<S>(
    store: &S,
    request: &CycleRequest,
    thresholds: &Thresholds,
) -> Result<Report, CycleError>
where
    S: Store + ?Sized,
{
    let profile = request.profile;
    let resolution = resolve(request.start_days_back, request.stop_days_back);
    let query = build(profile, resolution.window, store.source());
    log::debug!(
        "{}: querying {} over -{}d..-{}d",
        profile,
        query.source,
        query.range_start_days,
        query.range_stop_days
    );

    let batches = store.query(&query).map_err(|err| {
        log::error!("{}: store query failed: {}", profile, err);
        err
    })?;
    let batches = query.canonicalize(batches);

    let table = normalize(batches).map_err(|err| {
        match &err {
            NormalizeError::EmptyResult => log::warn!("{}: no data for selected range", profile),
            other => log::error!("{}: {}", profile, other),
        }
        err
    })?;

    let report = Report::from_table(profile, resolution, &table, thresholds)?;
    log::info!(
        "{}: report ready ({} samples, {} alerts)",
        profile,
        table.len(),
        report.alerts.len()
    );
    Ok(report)
}
