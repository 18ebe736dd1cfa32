use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use crate::error::{IterationError, MetricsError};
use crate::http::{EndpointStep, Outcome, RequestExecutor, TemplateVars};
use crate::metrics::{
    CHECKS, Counter, HTTP_REQ_DURATION, HTTP_REQ_FAILED, HTTP_REQS, MetricSink, Rate, Trend,
};
use crate::scheduler::{Iteration, IterationStatus, VuContext};

/// Metric handles fed once per request.
#[derive(Debug, Clone)]
pub(super) struct RequestMetrics {
    reqs: Counter,
    failed: Rate,
    checks: Rate,
    duration: Trend,
    error_rate: Option<Rate>,
    step_counters: BTreeMap<String, Counter>,
}

impl RequestMetrics {
    /// Registers the request metrics plus every counter a step names.
    pub(super) fn register(
        sink: &MetricSink,
        error_rate_metric: &str,
        steps: &[EndpointStep],
    ) -> Result<Self, MetricsError> {
        let reqs = sink.register_counter(HTTP_REQS)?;
        let failed = sink.register_rate(HTTP_REQ_FAILED)?;
        let checks = sink.register_rate(CHECKS)?;
        let duration = sink.register_trend(HTTP_REQ_DURATION)?;
        // Aliasing http_req_failed keeps that metric on the success predicate.
        let error_rate = if error_rate_metric == HTTP_REQ_FAILED {
            None
        } else {
            Some(sink.register_rate(error_rate_metric)?)
        };

        let mut step_counters = BTreeMap::new();
        let named = steps.iter().flat_map(|step| {
            step.success_counter
                .iter()
                .chain(step.failure_counter.iter())
        });
        for name in named {
            if step_counters.contains_key(name) {
                continue;
            }
            let counter = if sink.contains(name) {
                sink.counter(name)?
            } else {
                sink.register_counter(name)?
            };
            step_counters.insert(name.clone(), counter);
        }

        Ok(Self {
            reqs,
            failed,
            checks,
            duration,
            error_rate,
            step_counters,
        })
    }

    fn record(&self, step: &EndpointStep, outcome: &Outcome) -> bool {
        let success = outcome.is_success(&step.success);
        self.reqs.add(1);
        self.failed.add(!success);
        self.checks.add(success);
        if let Some(error_rate) = self.error_rate.as_ref() {
            error_rate.add(step.error_policy.is_error(success, outcome.status));
        }
        self.duration.add(outcome.latency);

        let counter_name = if success {
            step.success_counter.as_ref()
        } else {
            step.failure_counter.as_ref()
        };
        if let Some(counter) = counter_name.and_then(|name| self.step_counters.get(name)) {
            counter.add(1);
        }
        success
    }
}

/// Runs every step of the scenario in order, once per iteration.
pub(super) struct ScenarioIteration {
    executor: RequestExecutor,
    base_url: Url,
    steps: Arc<[EndpointStep]>,
    metrics: RequestMetrics,
}

impl ScenarioIteration {
    pub(super) const fn new(
        executor: RequestExecutor,
        base_url: Url,
        steps: Arc<[EndpointStep]>,
        metrics: RequestMetrics,
    ) -> Self {
        Self {
            executor,
            base_url,
            steps,
            metrics,
        }
    }
}

#[async_trait]
impl Iteration for ScenarioIteration {
    async fn run(&self, ctx: &VuContext) -> Result<IterationStatus, IterationError> {
        let vars = TemplateVars {
            vu: ctx.vu,
            iteration: ctx.iteration,
        };
        for step in self.steps.iter() {
            if ctx.should_stop() {
                return Ok(IterationStatus::Interrupted);
            }
            let outcome = self.executor.execute(step, &self.base_url, vars).await;
            let success = self.metrics.record(step, &outcome);
            if let Some(error) = outcome.error.as_ref() {
                debug!(
                    "VU {} {} {} failed: {}",
                    ctx.vu,
                    step.method.as_str(),
                    step.name,
                    error
                );
            } else if !success {
                debug!(
                    "VU {} {} {} returned {}",
                    ctx.vu,
                    step.method.as_str(),
                    step.name,
                    outcome.status
                );
            }
        }
        Ok(IterationStatus::Completed)
    }
}
