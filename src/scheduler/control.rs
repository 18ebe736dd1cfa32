use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use tokio::time::{Instant, sleep, sleep_until};
use tracing::debug;

use crate::shutdown::{ShutdownReceiver, ShutdownSender};

/// Stop condition shared by every virtual user.
#[derive(Debug)]
pub(super) struct StopSignal {
    stopped: AtomicBool,
    deadline: Instant,
    shutdown_tx: ShutdownSender,
}

impl StopSignal {
    pub(super) const fn new(deadline: Instant, shutdown_tx: ShutdownSender) -> Self {
        Self {
            stopped: AtomicBool::new(false),
            deadline,
            shutdown_tx,
        }
    }

    pub(super) const fn deadline(&self) -> Instant {
        self.deadline
    }

    pub(super) fn trigger(&self, reason: &str) {
        if !self.stopped.swap(true, Ordering::AcqRel) {
            debug!("Stopping virtual users: {}", reason);
            drop(self.shutdown_tx.send(()));
        }
    }

    pub(super) fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire) || Instant::now() >= self.deadline
    }

    pub(super) fn subscribe(&self) -> ShutdownReceiver {
        self.shutdown_tx.subscribe()
    }

    /// Sleeps for `duration` unless stop fires first. Returns whether the run
    /// is stopping.
    pub(super) async fn pause(&self, duration: Duration, shutdown_rx: &mut ShutdownReceiver) -> bool {
        if duration.is_zero() {
            return self.is_stopped();
        }
        tokio::select! {
            _ = shutdown_rx.recv() => true,
            () = sleep_until(self.deadline) => true,
            () = sleep(duration) => self.is_stopped(),
        }
    }
}

/// Shared iteration budget; reservations past the limit fail.
#[derive(Debug)]
pub(super) struct IterationBudget {
    limit: u64,
    reserved: AtomicU64,
}

impl IterationBudget {
    pub(super) fn new(limit: Option<u64>) -> Option<Self> {
        limit.map(|limit| IterationBudget {
            limit,
            reserved: AtomicU64::new(0),
        })
    }

    pub(super) fn try_reserve(&self) -> bool {
        loop {
            let current = self.reserved.load(Ordering::Relaxed);
            if current >= self.limit {
                return false;
            }
            let Some(next) = current.checked_add(1) else {
                return false;
            };
            if self
                .reserved
                .compare_exchange(current, next, Ordering::Relaxed, Ordering::Relaxed)
                .is_ok()
            {
                return true;
            }
        }
    }
}

/// Number of iterations currently running and the highest value seen.
#[derive(Debug, Default)]
pub(super) struct ActiveGauge {
    active: AtomicUsize,
    peak: AtomicUsize,
}

impl ActiveGauge {
    pub(super) fn peak(&self) -> usize {
        self.peak.load(Ordering::Relaxed)
    }
}

pub(super) struct ActiveGuard<'gauge> {
    gauge: &'gauge ActiveGauge,
}

impl<'gauge> ActiveGuard<'gauge> {
    pub(super) fn acquire(gauge: &'gauge ActiveGauge) -> Self {
        let previous = gauge.active.fetch_add(1, Ordering::AcqRel);
        gauge
            .peak
            .fetch_max(previous.saturating_add(1), Ordering::AcqRel);
        Self { gauge }
    }
}

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        loop {
            let current = self.gauge.active.load(Ordering::Acquire);
            let Some(next) = current.checked_sub(1) else {
                break;
            };
            if self
                .gauge
                .active
                .compare_exchange(current, next, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                break;
            }
        }
    }
}

/// Iteration tallies across all virtual users.
#[derive(Debug, Default)]
pub(super) struct IterationTally {
    pub(super) started: AtomicU64,
    pub(super) completed: AtomicU64,
    pub(super) failed: AtomicU64,
    pub(super) interrupted: AtomicU64,
}

impl IterationTally {
    /// Adds one, pinning at `u64::MAX`. Returns the previous value.
    pub(super) fn bump(counter: &AtomicU64) -> u64 {
        match counter.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |value| {
            Some(value.saturating_add(1))
        }) {
            Ok(previous) | Err(previous) => previous,
        }
    }

    pub(super) fn read(counter: &AtomicU64) -> u64 {
        counter.load(Ordering::Relaxed)
    }
}
