use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep, sleep_until};
use tracing::{info, warn};

use crate::shutdown::ShutdownSender;

use super::control::{ActiveGauge, IterationBudget, IterationTally, StopSignal};
use super::types::{SchedulerConfig, SchedulerStats};
use super::vu::{Iteration, VuShared, run_vu};

/// Handle to a running set of virtual users.
pub struct RunHandle {
    shared: Arc<VuShared>,
    vus: Vec<JoinHandle<()>>,
    watcher: JoinHandle<()>,
    started: Instant,
}

/// Spawns `config.vus` virtual users on the current tokio runtime.
///
/// A message on `shutdown_tx` stops the run the same way the deadline does.
/// Must be called from within a tokio runtime.
#[must_use]
pub fn start(
    config: SchedulerConfig,
    iteration: Arc<dyn Iteration>,
    shutdown_tx: &ShutdownSender,
) -> RunHandle {
    let started = Instant::now();
    let deadline = started.checked_add(config.duration).unwrap_or(started);
    let stop = Arc::new(StopSignal::new(deadline, shutdown_tx.clone()));
    let vu_count = config.vus;
    let shared = Arc::new(VuShared {
        budget: IterationBudget::new(config.max_iterations),
        config,
        iteration,
        stop: Arc::clone(&stop),
        gauge: ActiveGauge::default(),
        tally: IterationTally::default(),
    });

    let mut watcher_rx = stop.subscribe();
    let watcher_stop = Arc::clone(&stop);
    let watcher = tokio::spawn(async move {
        tokio::select! {
            _ = watcher_rx.recv() => watcher_stop.trigger("shutdown requested"),
            () = sleep_until(watcher_stop.deadline()) => watcher_stop.trigger("duration elapsed"),
        }
    });

    info!(
        "Starting {} virtual users for {:?}",
        vu_count, shared.config.duration
    );
    let mut vus = Vec::with_capacity(vu_count);
    for index in 0..vu_count {
        let vu = u64::try_from(index).unwrap_or(u64::MAX).saturating_add(1);
        vus.push(tokio::spawn(run_vu(vu, Arc::clone(&shared))));
    }

    RunHandle {
        shared,
        vus,
        watcher,
        started,
    }
}

impl RunHandle {
    /// Signals every virtual user to stop after its current request.
    pub fn stop(&self) {
        self.shared.stop.trigger("stop requested");
    }

    /// Waits for every virtual user to finish. Tasks still running
    /// `drain_timeout` after the stop point are aborted.
    pub async fn wait(self) -> SchedulerStats {
        let RunHandle {
            shared,
            vus,
            watcher,
            started,
        } = self;

        let deadline = shared.stop.deadline();
        let drain_timeout = shared.config.drain_timeout;
        let mut stop_rx = shared.stop.subscribe();
        let drain_window = async {
            if !shared.stop.is_stopped() {
                tokio::select! {
                    _ = stop_rx.recv() => {}
                    () = sleep_until(deadline) => {}
                }
            }
            sleep(drain_timeout).await;
        };
        tokio::pin!(drain_window);

        let mut expired = false;
        let mut aborted_vus: usize = 0;
        for mut handle in vus {
            let joined = if expired {
                false
            } else {
                tokio::select! {
                    result = &mut handle => {
                        if let Err(err) = result {
                            warn!("Virtual user task failed: {}", err);
                        }
                        true
                    }
                    () = &mut drain_window => false,
                }
            };
            if joined {
                continue;
            }
            expired = true;
            if !handle.is_finished() {
                handle.abort();
                aborted_vus = aborted_vus.saturating_add(1);
            }
        }
        watcher.abort();

        if aborted_vus > 0 {
            warn!(
                "Aborted {} virtual users still running after the drain window",
                aborted_vus
            );
        }

        let stats = SchedulerStats {
            iterations_started: IterationTally::read(&shared.tally.started),
            iterations_completed: IterationTally::read(&shared.tally.completed),
            iterations_failed: IterationTally::read(&shared.tally.failed),
            iterations_interrupted: IterationTally::read(&shared.tally.interrupted),
            peak_active_iterations: shared.gauge.peak(),
            aborted_vus,
            elapsed: started.elapsed(),
        };
        info!(
            "Virtual users finished: {} iterations started in {:?}",
            stats.iterations_started, stats.elapsed
        );
        stats
    }
}
