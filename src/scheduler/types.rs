use std::time::Duration;

use crate::metrics::Counter;

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub vus: usize,
    pub duration: Duration,
    pub iteration_sleep: Duration,
    /// Iterations shared by all virtual users; `None` means unlimited.
    pub max_iterations: Option<u64>,
    /// Time granted after stop for in-flight requests before tasks are aborted.
    pub drain_timeout: Duration,
    pub counters: Option<IterationCounters>,
}

/// Metric counters the scheduler feeds as iterations end.
#[derive(Debug, Clone)]
pub struct IterationCounters {
    pub completed: Counter,
    pub failed: Counter,
    pub interrupted: Counter,
}

/// How an iteration body ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterationStatus {
    Completed,
    /// A step was skipped because stop had been signalled.
    Interrupted,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    pub iterations_started: u64,
    pub iterations_completed: u64,
    pub iterations_failed: u64,
    pub iterations_interrupted: u64,
    pub peak_active_iterations: usize,
    /// Tasks still running after the drain window.
    pub aborted_vus: usize,
    pub elapsed: Duration,
}
