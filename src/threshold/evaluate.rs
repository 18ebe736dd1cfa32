use crate::error::ThresholdError;
use crate::metrics::{MetricSink, MetricsSnapshot};

use super::types::{ThresholdExpr, ThresholdReport, ThresholdResult};

/// Checks that every threshold names a registered metric with a compatible
/// aggregate.
///
/// # Errors
///
/// Returns the first threshold that refers to an unknown metric or uses an
/// aggregate its metric kind does not have.
pub fn validate(thresholds: &[ThresholdExpr], sink: &MetricSink) -> Result<(), ThresholdError> {
    for threshold in thresholds {
        let Some(kind) = sink.kind_of(&threshold.metric) else {
            return Err(ThresholdError::UnknownMetric {
                expr: threshold.source.clone(),
                metric: threshold.metric.clone(),
            });
        };
        if !threshold.aggregate.supports(kind) {
            return Err(ThresholdError::IncompatibleAggregate {
                expr: threshold.source.clone(),
                aggregate: threshold.aggregate.to_string(),
                kind,
            });
        }
    }
    Ok(())
}

/// Evaluates every threshold against the snapshot. A metric missing from the
/// snapshot fails its threshold.
#[must_use]
pub fn evaluate(snapshot: &MetricsSnapshot, thresholds: &[ThresholdExpr]) -> ThresholdReport {
    let mut report = ThresholdReport {
        pass: true,
        violations: Vec::new(),
        results: Vec::with_capacity(thresholds.len()),
    };

    for threshold in thresholds {
        let observed = snapshot
            .get(&threshold.metric)
            .and_then(|value| threshold.aggregate.observe(value));
        let pass = observed.is_some_and(|value| threshold.op.holds(value.cmp(&threshold.bound)));
        if !pass {
            report.pass = false;
            report.violations.push(threshold.source.clone());
        }
        report.results.push(ThresholdResult {
            expr: threshold.clone(),
            observed,
            pass,
        });
    }

    report
}
