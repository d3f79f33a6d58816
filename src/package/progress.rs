use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Progress snapshot pushed to callers after each completed item.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Progress {
    /// Items completed so far.
    pub current: usize,
    /// Items in the run.
    pub total: usize,
    /// `100 * current / total`.
    pub percentage: f64,
    /// Average-throughput estimate of the remaining time, in seconds.
    #[serde(rename = "estimatedTimeRemaining")]
    pub estimated_time_remaining: f64,
}

impl Progress {
    /// Remaining time as a [`Duration`].
    pub fn eta(&self) -> Duration {
        Duration::from_secs_f64(self.estimated_time_remaining.max(0.0))
    }
}

/// Stateless progress/ETA computation.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProgressReporter;

impl ProgressReporter {
    /// Snapshot after `completed` of `total` items took `elapsed_secs`.
    ///
    /// Returns `None` until at least one item completed, since no throughput is known yet.
    pub fn report(completed: usize, total: usize, elapsed_secs: f64) -> Option<Progress> {
        if completed == 0 || total == 0 {
            return None;
        }
        let elapsed = if elapsed_secs.is_finite() {
            elapsed_secs.max(0.0)
        } else {
            0.0
        };
        let per_item = elapsed / completed as f64;
        Some(Progress {
            current: completed,
            total,
            percentage: 100.0 * completed as f64 / total as f64,
            estimated_time_remaining: per_item * total.saturating_sub(completed) as f64,
        })
    }
}

/// Wall clock for one run.
#[derive(Clone, Copy, Debug)]
pub(crate) struct RunClock {
    started: Instant,
}

impl RunClock {
    pub(crate) fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub(crate) fn elapsed_secs(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }
}

/// Shared flag a caller sets to stop a run at the next batch boundary.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create an unset token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Return `true` once cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/package/progress.rs"]
mod tests;
