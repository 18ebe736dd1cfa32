use std::collections::BTreeMap;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tokio::io::{AsyncWriteExt, BufWriter};

use crate::error::AppResult;
use crate::metrics::{MetricValue, Ratio, TrendSnapshot};
use crate::runner::{RunOutcome, RunParameters};

use super::format::{format_fixed, format_observed};

const MICROS_PER_MILLI: u128 = 1_000;
/// Decimals kept for fractional JSON values.
const JSON_DECIMALS: u32 = 6;

#[derive(Debug, Clone, Serialize)]
pub struct JsonReport {
    pub generated_at: String,
    pub parameters: RunParameters,
    pub metrics: BTreeMap<String, JsonMetric>,
    pub scheduler: JsonScheduler,
    pub thresholds: Vec<JsonThreshold>,
    pub pass: bool,
    pub exit_code: u8,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum JsonMetric {
    Counter {
        count: u64,
    },
    Rate {
        passes: u64,
        total: u64,
        rate: f64,
    },
    Trend {
        count: u64,
        avg_ms: f64,
        min_ms: f64,
        med_ms: f64,
        max_ms: f64,
        p90_ms: f64,
        p95_ms: f64,
        p99_ms: f64,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonScheduler {
    pub iterations_started: u64,
    pub iterations_completed: u64,
    pub iterations_failed: u64,
    pub iterations_interrupted: u64,
    pub peak_active_iterations: usize,
    pub aborted_vus: usize,
    pub elapsed_ms: u128,
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonThreshold {
    pub expression: String,
    pub metric: String,
    pub observed: String,
    pub pass: bool,
}

/// Builds the JSON document for a finished run.
#[must_use]
pub fn json_report(outcome: &RunOutcome) -> JsonReport {
    let metrics = outcome
        .snapshot
        .metrics
        .iter()
        .map(|(name, value)| (name.clone(), json_metric(value)))
        .collect();
    let stats = &outcome.stats;
    let thresholds = outcome
        .thresholds
        .results
        .iter()
        .map(|result| JsonThreshold {
            expression: result.expr.source.clone(),
            metric: result.expr.metric.clone(),
            observed: format_observed(result.expr.aggregate, result.observed),
            pass: result.pass,
        })
        .collect();

    JsonReport {
        generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        parameters: outcome.parameters.clone(),
        metrics,
        scheduler: JsonScheduler {
            iterations_started: stats.iterations_started,
            iterations_completed: stats.iterations_completed,
            iterations_failed: stats.iterations_failed,
            iterations_interrupted: stats.iterations_interrupted,
            peak_active_iterations: stats.peak_active_iterations,
            aborted_vus: stats.aborted_vus,
            elapsed_ms: stats.elapsed.as_millis(),
        },
        thresholds,
        pass: outcome.thresholds.pass,
        exit_code: outcome.exit_code(),
    }
}

/// Writes the JSON report to `path`.
///
/// # Errors
///
/// Returns an error when the file cannot be written or the report cannot be
/// serialized.
pub async fn export_summary(path: &str, outcome: &RunOutcome) -> AppResult<()> {
    let body = serde_json::to_vec_pretty(&json_report(outcome))?;
    let file = tokio::fs::File::create(path).await?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&body).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}

fn json_metric(value: &MetricValue) -> JsonMetric {
    match value {
        MetricValue::Counter { count } => JsonMetric::Counter { count: *count },
        MetricValue::Rate { passes, total } => JsonMetric::Rate {
            passes: *passes,
            total: *total,
            rate: decimal(Ratio::new(u128::from(*passes), u128::from(*total))),
        },
        MetricValue::Trend(trend) => json_trend(trend),
    }
}

fn json_trend(trend: &TrendSnapshot) -> JsonMetric {
    let ms = |micros: u64| decimal(Ratio::new(u128::from(micros), MICROS_PER_MILLI));
    JsonMetric::Trend {
        count: trend.count,
        avg_ms: decimal(trend.avg_us().divided(MICROS_PER_MILLI)),
        min_ms: ms(trend.min_us()),
        med_ms: ms(trend.percentile_us(50_000)),
        max_ms: ms(trend.max_us()),
        p90_ms: ms(trend.percentile_us(90_000)),
        p95_ms: ms(trend.percentile_us(95_000)),
        p99_ms: ms(trend.percentile_us(99_000)),
    }
}

/// Exact ratio rendered to a JSON number through its decimal text.
fn decimal(value: Ratio) -> f64 {
    format_fixed(value, JSON_DECIMALS).parse().unwrap_or(0.0)
}
