use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::FutureExt;
use tracing::{debug, warn};

use crate::error::IterationError;

use super::control::{ActiveGauge, ActiveGuard, IterationBudget, IterationTally, StopSignal};
use super::types::{IterationCounters, IterationStatus, SchedulerConfig};

/// Body run by every virtual user on each iteration.
#[async_trait]
pub trait Iteration: Send + Sync {
    /// Runs one iteration.
    ///
    /// # Errors
    ///
    /// Returns an error when the iteration fails; the scheduler counts it and
    /// the virtual user carries on.
    async fn run(&self, ctx: &VuContext) -> Result<IterationStatus, IterationError>;
}

/// Per-iteration view a virtual user hands to the iteration body.
#[derive(Debug, Clone)]
pub struct VuContext {
    pub vu: u64,
    /// Zero-based iteration index of this virtual user.
    pub iteration: u64,
    stop: Arc<StopSignal>,
}

impl VuContext {
    /// True once the deadline has passed or a stop was signalled. Checked
    /// before each step.
    #[must_use]
    pub fn should_stop(&self) -> bool {
        self.stop.is_stopped()
    }
}

pub(super) struct VuShared {
    pub(super) config: SchedulerConfig,
    pub(super) iteration: Arc<dyn Iteration>,
    pub(super) stop: Arc<StopSignal>,
    pub(super) budget: Option<IterationBudget>,
    pub(super) gauge: ActiveGauge,
    pub(super) tally: IterationTally,
}

pub(super) async fn run_vu(vu: u64, shared: Arc<VuShared>) {
    let mut shutdown_rx = shared.stop.subscribe();
    let mut iteration: u64 = 0;
    debug!("VU {} started", vu);

    loop {
        if shared.stop.is_stopped() {
            break;
        }
        if let Some(budget) = shared.budget.as_ref()
            && !budget.try_reserve()
        {
            shared.stop.trigger("iteration budget exhausted");
            break;
        }

        let ctx = VuContext {
            vu,
            iteration,
            stop: Arc::clone(&shared.stop),
        };
        IterationTally::bump(&shared.tally.started);
        let guard = ActiveGuard::acquire(&shared.gauge);
        let result = AssertUnwindSafe(shared.iteration.run(&ctx))
            .catch_unwind()
            .await;
        drop(guard);
        record_result(vu, &shared, result);
        iteration = iteration.saturating_add(1);

        if shared
            .stop
            .pause(shared.config.iteration_sleep, &mut shutdown_rx)
            .await
        {
            break;
        }
    }

    debug!("VU {} finished after {} iterations", vu, iteration);
}

fn record_result(
    vu: u64,
    shared: &VuShared,
    result: Result<Result<IterationStatus, IterationError>, Box<dyn Any + Send>>,
) {
    let counters = shared.config.counters.as_ref();
    match result {
        Ok(Ok(IterationStatus::Completed)) => {
            IterationTally::bump(&shared.tally.completed);
            if let Some(counters) = counters {
                counters.completed.add(1);
            }
        }
        Ok(Ok(IterationStatus::Interrupted)) => {
            IterationTally::bump(&shared.tally.interrupted);
            if let Some(counters) = counters {
                counters.interrupted.add(1);
            }
        }
        Ok(Err(err)) => {
            warn!("{}", err);
            record_failure(shared, counters);
        }
        Err(payload) => {
            let err = IterationError::Panicked {
                vu,
                message: panic_message(payload.as_ref()),
            };
            warn!("{}", err);
            record_failure(shared, counters);
        }
    }
}

fn record_failure(shared: &VuShared, counters: Option<&IterationCounters>) {
    IterationTally::bump(&shared.tally.failed);
    if let Some(counters) = counters {
        counters.failed.add(1);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return (*message).to_owned();
    }
    if let Some(message) = payload.downcast_ref::<String>() {
        return message.clone();
    }
    "non-string panic payload".to_owned()
}
