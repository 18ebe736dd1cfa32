use super::*;
use crate::error::{AppError, AppResult, IterationError};
use crate::metrics::{MetricSink, MetricsSnapshot};
use crate::shutdown_handlers::shutdown_channel;
use async_trait::async_trait;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::{Instant, sleep};

const SHORT_RUN: Duration = Duration::from_millis(300);
const START_SLACK: Duration = Duration::from_millis(25);

fn run_async_test<F>(future: F) -> AppResult<()>
where
    F: Future<Output = AppResult<()>>,
{
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .map_err(|err| AppError::validation(format!("Failed to build runtime: {}", err)))?;
    runtime.block_on(future)
}

fn config(vus: usize, duration: Duration) -> SchedulerConfig {
    SchedulerConfig {
        vus,
        duration,
        iteration_sleep: Duration::ZERO,
        max_iterations: None,
        drain_timeout: Duration::from_secs(1),
        counters: None,
    }
}

struct Sleepy {
    pause: Duration,
    starts: Mutex<Vec<Instant>>,
}

impl Sleepy {
    fn new(pause: Duration) -> Arc<Self> {
        Arc::new(Self {
            pause,
            starts: Mutex::new(Vec::new()),
        })
    }

    fn starts(&self) -> Vec<Instant> {
        match self.starts.lock() {
            Ok(starts) => starts.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl Iteration for Sleepy {
    async fn run(&self, _ctx: &VuContext) -> Result<IterationStatus, IterationError> {
        if let Ok(mut starts) = self.starts.lock() {
            starts.push(Instant::now());
        }
        sleep(self.pause).await;
        Ok(IterationStatus::Completed)
    }
}

/// Panics on the first iteration of VU 1, fails every third iteration.
struct Flaky;

#[async_trait]
impl Iteration for Flaky {
    async fn run(&self, ctx: &VuContext) -> Result<IterationStatus, IterationError> {
        sleep(Duration::from_millis(5)).await;
        if ctx.vu == 1 && ctx.iteration == 0 {
            std::panic::panic_any("boom");
        }
        if ctx.iteration % 3 == 2 {
            return Err(IterationError::Step {
                vu: ctx.vu,
                step: "/".to_owned(),
                reason: "scripted failure".to_owned(),
            });
        }
        Ok(IterationStatus::Completed)
    }
}

/// Two steps; the second is skipped once stop has been signalled.
struct TwoSteps;

#[async_trait]
impl Iteration for TwoSteps {
    async fn run(&self, ctx: &VuContext) -> Result<IterationStatus, IterationError> {
        sleep(Duration::from_millis(150)).await;
        if ctx.should_stop() {
            return Ok(IterationStatus::Interrupted);
        }
        sleep(Duration::from_millis(10)).await;
        Ok(IterationStatus::Completed)
    }
}

/// Ignores stop entirely.
struct Stuck;

#[async_trait]
impl Iteration for Stuck {
    async fn run(&self, _ctx: &VuContext) -> Result<IterationStatus, IterationError> {
        sleep(Duration::from_secs(30)).await;
        Ok(IterationStatus::Completed)
    }
}

#[test]
fn no_iteration_starts_after_deadline() -> AppResult<()> {
    run_async_test(async {
        let (shutdown_tx, _) = shutdown_channel();
        let iteration = Sleepy::new(Duration::from_millis(20));
        let before = Instant::now();
        let handle = start(config(3, SHORT_RUN), iteration.clone(), &shutdown_tx);
        let stats = handle.wait().await;

        let starts = iteration.starts();
        if starts.is_empty() {
            return Err(AppError::validation("Expected iterations to run"));
        }
        let latest_allowed = before + SHORT_RUN + START_SLACK;
        if starts.iter().any(|started| *started > latest_allowed) {
            return Err(AppError::validation("An iteration started after the deadline"));
        }
        if stats.elapsed > SHORT_RUN + Duration::from_secs(1) {
            return Err(AppError::validation(format!(
                "Run took too long: {:?}",
                stats.elapsed
            )));
        }
        if stats.iterations_started != stats.iterations_completed {
            return Err(AppError::validation(format!("Unexpected stats: {:?}", stats)));
        }
        Ok(())
    })
}

#[test]
fn peak_active_iterations_never_exceeds_vus() -> AppResult<()> {
    run_async_test(async {
        let (shutdown_tx, _) = shutdown_channel();
        let handle = start(
            config(4, SHORT_RUN),
            Sleepy::new(Duration::from_millis(10)),
            &shutdown_tx,
        );
        let stats = handle.wait().await;
        if stats.peak_active_iterations == 0 || stats.peak_active_iterations > 4 {
            return Err(AppError::validation(format!(
                "Unexpected peak: {}",
                stats.peak_active_iterations
            )));
        }
        Ok(())
    })
}

#[test]
fn panics_and_errors_are_counted_and_vu_continues() -> AppResult<()> {
    run_async_test(async {
        let sink = MetricSink::new();
        let counters = IterationCounters {
            completed: sink.register_counter("iterations")?,
            failed: sink.register_counter("iteration_failures")?,
            interrupted: sink.register_counter("iterations_interrupted")?,
        };
        let mut scheduler_config = config(2, SHORT_RUN);
        scheduler_config.counters = Some(counters);

        let (shutdown_tx, _) = shutdown_channel();
        let stats = start(scheduler_config, Arc::new(Flaky), &shutdown_tx)
            .wait()
            .await;

        if stats.iterations_failed < 2 {
            return Err(AppError::validation(format!("Unexpected stats: {:?}", stats)));
        }
        if stats.iterations_completed < 2 {
            return Err(AppError::validation("VU 1 did not continue after the panic"));
        }
        let snapshot: MetricsSnapshot = sink.snapshot();
        if snapshot.counter("iteration_failures") != Some(stats.iterations_failed) {
            return Err(AppError::validation("Failure counter disagrees with stats"));
        }
        if snapshot.counter("iterations") != Some(stats.iterations_completed) {
            return Err(AppError::validation("Iteration counter disagrees with stats"));
        }
        Ok(())
    })
}

#[test]
fn iteration_budget_is_shared_across_vus() -> AppResult<()> {
    run_async_test(async {
        let mut scheduler_config = config(3, Duration::from_secs(10));
        scheduler_config.max_iterations = Some(7);
        let (shutdown_tx, _) = shutdown_channel();
        let stats = start(
            scheduler_config,
            Sleepy::new(Duration::from_millis(5)),
            &shutdown_tx,
        )
        .wait()
        .await;

        if stats.iterations_started != 7 || stats.iterations_completed != 7 {
            return Err(AppError::validation(format!("Unexpected stats: {:?}", stats)));
        }
        if stats.elapsed >= Duration::from_secs(5) {
            return Err(AppError::validation("Budget exhaustion did not stop the run"));
        }
        Ok(())
    })
}

#[test]
fn stop_and_shutdown_broadcast_end_the_run_early() -> AppResult<()> {
    run_async_test(async {
        let mut scheduler_config = config(2, Duration::from_secs(10));
        scheduler_config.iteration_sleep = Duration::from_secs(5);
        let (shutdown_tx, _) = shutdown_channel();

        let handle = start(
            scheduler_config.clone(),
            Sleepy::new(Duration::from_millis(5)),
            &shutdown_tx,
        );
        sleep(Duration::from_millis(50)).await;
        handle.stop();
        let stats = handle.wait().await;
        if stats.elapsed >= Duration::from_secs(2) {
            return Err(AppError::validation("stop() did not cut the sleep short"));
        }

        let (shutdown_tx, _) = shutdown_channel();
        let handle = start(
            scheduler_config,
            Sleepy::new(Duration::from_millis(5)),
            &shutdown_tx,
        );
        sleep(Duration::from_millis(50)).await;
        if shutdown_tx.send(()).is_err() {
            return Err(AppError::validation("Failed to send shutdown"));
        }
        let stats = handle.wait().await;
        if stats.elapsed >= Duration::from_secs(2) {
            return Err(AppError::validation("Shutdown broadcast did not stop the run"));
        }
        Ok(())
    })
}

#[test]
fn steps_after_stop_mark_iteration_interrupted() -> AppResult<()> {
    run_async_test(async {
        let (shutdown_tx, _) = shutdown_channel();
        let stats = start(
            config(2, Duration::from_millis(100)),
            Arc::new(TwoSteps),
            &shutdown_tx,
        )
        .wait()
        .await;
        if stats.iterations_interrupted != 2 || stats.iterations_completed != 0 {
            return Err(AppError::validation(format!("Unexpected stats: {:?}", stats)));
        }
        Ok(())
    })
}

#[test]
fn stuck_vus_are_aborted_after_drain_window() -> AppResult<()> {
    run_async_test(async {
        let mut scheduler_config = config(2, Duration::from_millis(100));
        scheduler_config.drain_timeout = Duration::from_millis(100);
        let (shutdown_tx, _) = shutdown_channel();
        let stats = start(scheduler_config, Arc::new(Stuck), &shutdown_tx)
            .wait()
            .await;
        if stats.aborted_vus != 2 {
            return Err(AppError::validation(format!("Unexpected stats: {:?}", stats)));
        }
        if stats.elapsed >= Duration::from_secs(2) {
            return Err(AppError::validation("Hard stop did not bound the run"));
        }
        Ok(())
    })
}
