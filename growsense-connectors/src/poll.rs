//! Periodic reporting
//!
//! Repeats [`run_cycle`] on a fixed interval. Each tick runs one cycle on the
//! blocking pool; a tick that comes due while the previous cycle is still
//! running is skipped rather than queued. Ticks share nothing but the store
//! and thresholds, which are read-only.

use std::sync::Arc;
use std::time::Duration;

use growsense_core::{Report, Thresholds};
use tokio::time::MissedTickBehavior;

use crate::{run_cycle, CycleError, CycleRequest, Store};

/// Shortest interval a poller will accept
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Runs reporting cycles on an interval
pub struct Poller<S> {
    store: Arc<S>,
    request: CycleRequest,
    thresholds: Arc<Thresholds>,
    interval: Duration,
}

impl<S> Poller<S>
where
    S: Store + Send + Sync + 'static,
{
    /// Create a poller; intervals below [`MIN_POLL_INTERVAL`] are raised to it
    pub fn new(
        store: Arc<S>,
        request: CycleRequest,
        thresholds: Arc<Thresholds>,
        interval: Duration,
    ) -> Self {
        if interval < MIN_POLL_INTERVAL {
            log::warn!(
                "poll interval {:?} below minimum, using {:?}",
                interval,
                MIN_POLL_INTERVAL
            );
        }
        Self {
            store,
            request,
            thresholds,
            interval: interval.max(MIN_POLL_INTERVAL),
        }
    }

    /// Effective interval between cycles
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run `cycles` cycles (forever with `None`), handing each outcome to
    /// `on_report`. The first cycle starts immediately. A cycle whose task
    /// panics is handed over as [`CycleError::Interrupted`].
    pub async fn run<F>(&self, cycles: Option<usize>, mut on_report: F)
    where
        F: FnMut(Result<Report, CycleError>),
    {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut completed = 0usize;
        while cycles.map_or(true, |n| completed < n) {
            ticker.tick().await;
            completed += 1;

            let store = Arc::clone(&self.store);
            let thresholds = Arc::clone(&self.thresholds);
            let request = self.request;

            let joined = tokio::task::spawn_blocking(move || {
                run_cycle(store.as_ref(), &request, thresholds.as_ref())
            })
            .await;

            match joined {
                Ok(outcome) => on_report(outcome),
                Err(err) => {
                    log::error!("cycle {} did not complete: {}", completed, err);
                    on_report(Err(CycleError::Interrupted(err.to_string())));
                }
            }
        }
    }
}
