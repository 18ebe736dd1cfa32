use std::time::Duration;

use crate::metrics::{MetricValue, Ratio, TrendSnapshot};
use crate::runner::RunOutcome;

use super::format::{format_ms, format_observed, format_percent};

/// Width metric names are padded to, dots included.
const NAME_COLUMN: usize = 28;
const PASS_MARK: &str = "✓";
const FAIL_MARK: &str = "✗";

/// Summary lines of the text report, in print order.
#[must_use]
pub fn report_lines(outcome: &RunOutcome) -> Vec<String> {
    let mut lines = Vec::new();
    let parameters = &outcome.parameters;

    lines.push(format!("Target: {}", parameters.base_url));
    lines.push(format!(
        "VUs: {}  Duration: {}  Iteration Sleep: {}",
        parameters.vus,
        format_millis(parameters.duration_ms),
        format_millis(parameters.iteration_sleep_ms)
    ));
    match parameters.scenario {
        Some(scenario) => lines.push(format!(
            "Scenario: {} ({} steps)",
            scenario.as_str(),
            parameters.steps.len()
        )),
        None => lines.push(format!("Scenario: configured ({} steps)", parameters.steps.len())),
    }
    if let Some(limit) = parameters.max_iterations {
        lines.push(format!("Iteration Budget: {}", limit));
    }
    lines.push(String::new());

    for (name, value) in &outcome.snapshot.metrics {
        lines.push(format!("{} {}", dotted(name), metric_value(value)));
    }
    lines.push(String::new());

    let stats = &outcome.stats;
    lines.push(format!(
        "Iterations: {} started, {} completed, {} failed, {} interrupted",
        stats.iterations_started,
        stats.iterations_completed,
        stats.iterations_failed,
        stats.iterations_interrupted
    ));
    lines.push(format!(
        "Peak Active Iterations: {}  Elapsed: {}",
        stats.peak_active_iterations,
        format_duration(stats.elapsed)
    ));
    if stats.aborted_vus > 0 {
        lines.push(format!("Aborted VUs: {}", stats.aborted_vus));
    }

    if !outcome.thresholds.results.is_empty() {
        lines.push(String::new());
        lines.push("Thresholds:".to_owned());
        for result in &outcome.thresholds.results {
            let mark = if result.pass { PASS_MARK } else { FAIL_MARK };
            lines.push(format!(
                "  {} {} ({})",
                mark,
                result.expr,
                format_observed(result.expr.aggregate, result.observed)
            ));
        }
    }

    lines.push(String::new());
    lines.push(if outcome.thresholds.pass {
        "Result: PASS".to_owned()
    } else {
        "Result: FAIL".to_owned()
    });
    lines
}

fn dotted(name: &str) -> String {
    let mut padded = String::with_capacity(NAME_COLUMN);
    padded.push_str(name);
    while padded.chars().count() < NAME_COLUMN {
        padded.push('.');
    }
    padded.push(':');
    padded
}

fn metric_value(value: &MetricValue) -> String {
    match value {
        MetricValue::Counter { count } => count.to_string(),
        MetricValue::Rate { passes, total } => {
            format!("{}/{} ({})", passes, total, format_percent(*passes, *total))
        }
        MetricValue::Trend(trend) => trend_line(trend),
    }
}

fn trend_line(trend: &TrendSnapshot) -> String {
    if trend.count == 0 {
        return "no samples".to_owned();
    }
    let micros = |value: u64| format_ms(Ratio::whole(u128::from(value)));
    format!(
        "avg={} min={} med={} max={} p(90)={} p(95)={}",
        format_ms(trend.avg_us()),
        micros(trend.min_us()),
        micros(trend.percentile_us(50_000)),
        micros(trend.max_us()),
        micros(trend.percentile_us(90_000)),
        micros(trend.percentile_us(95_000))
    )
}

fn format_millis(millis: u128) -> String {
    format_duration(Duration::from_millis(u64::try_from(millis).unwrap_or(u64::MAX)))
}

fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis.is_multiple_of(1_000) {
        format!("{}s", millis / 1_000)
    } else {
        format!("{}ms", millis)
    }
}
