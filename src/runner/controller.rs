use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::args::ScenarioName;
use crate::error::AppResult;
use crate::http::{RequestExecutor, build_client};
use crate::metrics::{
    ITERATION_FAILURES, ITERATIONS, ITERATIONS_INTERRUPTED, MetricSink, MetricsSnapshot,
};
use crate::scheduler::{self, IterationCounters, SchedulerConfig, SchedulerStats};
use crate::shutdown::ShutdownSender;
use crate::threshold::{ThresholdExpr, ThresholdReport, evaluate, parse_thresholds, validate};

use super::config::RunConfig;
use super::iteration::{RequestMetrics, ScenarioIteration};

/// Exit code when every threshold passed.
const EXIT_PASS: u8 = 0;
/// Exit code when at least one threshold was violated.
const EXIT_THRESHOLD_FAILED: u8 = 1;

/// Run parameters echoed in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunParameters {
    pub base_url: String,
    pub vus: usize,
    pub duration_ms: u128,
    pub iteration_sleep_ms: u128,
    pub max_iterations: Option<u64>,
    pub scenario: Option<ScenarioName>,
    pub steps: Vec<String>,
}

impl RunParameters {
    fn from_config(config: &RunConfig) -> Self {
        Self {
            base_url: config.base_url.to_string(),
            vus: config.vus,
            duration_ms: config.duration.as_millis(),
            iteration_sleep_ms: config.iteration_sleep.as_millis(),
            max_iterations: config.max_iterations,
            scenario: config.scenario,
            steps: config
                .steps
                .iter()
                .map(|step| format!("{} {}", step.method.as_str(), step.path))
                .collect(),
        }
    }
}

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub parameters: RunParameters,
    pub snapshot: MetricsSnapshot,
    pub thresholds: ThresholdReport,
    pub stats: SchedulerStats,
}

impl RunOutcome {
    /// Process exit code for the run: 0 when every threshold passed, 1
    /// otherwise.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        if self.thresholds.pass {
            EXIT_PASS
        } else {
            EXIT_THRESHOLD_FAILED
        }
    }
}

pub struct RunController {
    config: RunConfig,
    sink: Arc<MetricSink>,
    thresholds: Vec<ThresholdExpr>,
    iteration: Arc<ScenarioIteration>,
    counters: IterationCounters,
}

impl RunController {
    /// Registers metrics, checks thresholds against them and builds the HTTP
    /// client.
    ///
    /// # Errors
    ///
    /// Returns an error when a metric name is invalid or duplicated, a
    /// threshold is malformed or refers to an unknown metric, or the HTTP
    /// client cannot be built.
    pub fn new(config: RunConfig) -> AppResult<Self> {
        let sink = Arc::new(MetricSink::new());
        let counters = IterationCounters {
            completed: sink.register_counter(ITERATIONS)?,
            failed: sink.register_counter(ITERATION_FAILURES)?,
            interrupted: sink.register_counter(ITERATIONS_INTERRUPTED)?,
        };
        let request_metrics =
            RequestMetrics::register(&sink, &config.error_rate_metric, &config.steps)?;

        let thresholds = parse_thresholds(&config.thresholds)?;
        validate(&thresholds, &sink)?;

        let client = build_client(config.request_timeout, config.connect_timeout)?;
        let iteration = Arc::new(ScenarioIteration::new(
            RequestExecutor::new(client),
            config.base_url.clone(),
            Arc::clone(&config.steps),
            request_metrics,
        ));

        Ok(Self {
            config,
            sink,
            thresholds,
            iteration,
            counters,
        })
    }

    #[must_use]
    pub fn sink(&self) -> &MetricSink {
        &self.sink
    }

    #[must_use]
    pub fn thresholds(&self) -> &[ThresholdExpr] {
        &self.thresholds
    }

    /// Runs the scenario until the stop condition, then evaluates thresholds
    /// against the final snapshot.
    ///
    /// # Errors
    ///
    /// None at present; setup failures surface from [`RunController::new`].
    pub async fn run(self, shutdown_tx: &ShutdownSender) -> AppResult<RunOutcome> {
        let RunController {
            config,
            sink,
            thresholds,
            iteration,
            counters,
        } = self;

        info!(
            "Running {} steps with {} VUs against {} for {:?}",
            config.steps.len(),
            config.vus,
            config.base_url,
            config.duration
        );
        let scheduler_config = SchedulerConfig {
            vus: config.vus,
            duration: config.duration,
            iteration_sleep: config.iteration_sleep,
            max_iterations: config.max_iterations,
            drain_timeout: config.drain_timeout(),
            counters: Some(counters),
        };
        let handle = scheduler::start(scheduler_config, iteration, shutdown_tx);
        let stats = handle.wait().await;

        let snapshot = sink.snapshot();
        let report = evaluate(&snapshot, &thresholds);
        for violation in &report.violations {
            warn!("Threshold violated: {}", violation);
        }
        info!(
            "Run finished in {:?}: {} iterations, thresholds {}",
            stats.elapsed,
            stats.iterations_completed,
            if report.pass { "passed" } else { "failed" }
        );

        Ok(RunOutcome {
            parameters: RunParameters::from_config(&config),
            snapshot,
            thresholds: report,
            stats,
        })
    }
}
