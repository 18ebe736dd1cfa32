use super::*;
use crate::error::{AppError, AppResult, ThresholdError};
use crate::metrics::{MetricSink, Ratio};
use std::time::Duration;

fn expect_parse_error(expr: &str) -> AppResult<()> {
    match parse_threshold(expr) {
        Err(ThresholdError::Parse { expr: reported, .. })
        | Err(ThresholdError::InvalidBound { expr: reported, .. }) => {
            if reported != expr.trim() {
                return Err(AppError::validation(format!(
                    "Error names '{}' instead of '{}'",
                    reported, expr
                )));
            }
            Ok(())
        }
        Err(other) => Err(AppError::validation(format!(
            "Unexpected error for '{}': {}",
            expr, other
        ))),
        Ok(parsed) => Err(AppError::validation(format!(
            "Expected '{}' to be rejected, got {:?}",
            expr, parsed
        ))),
    }
}

#[test]
fn parses_common_forms() -> AppResult<()> {
    let spaced = parse_threshold("http_req_duration: p(95) < 2000")?;
    let compact = parse_threshold("http_req_duration:p95<2000ms")?;
    let seconds = parse_threshold("http_req_duration: p(95)<2s")?;

    for parsed in [&spaced, &compact, &seconds] {
        if parsed.metric != "http_req_duration" {
            return Err(AppError::validation(format!("Unexpected metric: {}", parsed.metric)));
        }
        if parsed.aggregate != Aggregate::Percentile(95_000) {
            return Err(AppError::validation(format!(
                "Unexpected aggregate: {}",
                parsed.aggregate
            )));
        }
        if parsed.op != Comparison::Lt {
            return Err(AppError::validation("Expected '<'"));
        }
        if parsed.bound != Ratio::whole(2_000_000) {
            return Err(AppError::validation(format!("Unexpected bound: {:?}", parsed.bound)));
        }
    }

    let rate = parse_threshold("error_rate: rate<0.5")?;
    if rate.aggregate != Aggregate::Rate || rate.bound.fixed(1) != 5 {
        return Err(AppError::validation(format!("Unexpected rate threshold: {:?}", rate)));
    }

    let count = parse_threshold("http_reqs: count>=10")?;
    if count.op != Comparison::Ge || count.bound != Ratio::whole(10) {
        return Err(AppError::validation(format!("Unexpected count threshold: {:?}", count)));
    }
    Ok(())
}

#[test]
fn parses_every_operator() -> AppResult<()> {
    let cases = [
        ("m: count<1", Comparison::Lt),
        ("m: count<=1", Comparison::Le),
        ("m: count>1", Comparison::Gt),
        ("m: count>=1", Comparison::Ge),
        ("m: count==1", Comparison::Eq),
        ("m: count!=1", Comparison::Ne),
    ];
    for (expr, expected) in cases {
        let parsed = parse_threshold(expr)?;
        if parsed.op != expected {
            return Err(AppError::validation(format!(
                "'{}' parsed as {}, expected {}",
                expr, parsed.op, expected
            )));
        }
    }
    Ok(())
}

#[test]
fn fractional_percentile_displays_exactly() -> AppResult<()> {
    let parsed = parse_threshold("http_req_duration: p(99.9)<500")?;
    if parsed.aggregate != Aggregate::Percentile(99_900) {
        return Err(AppError::validation(format!("Unexpected aggregate: {:?}", parsed.aggregate)));
    }
    if parsed.aggregate.to_string() != "p(99.9)" {
        return Err(AppError::validation(format!("Unexpected display: {}", parsed.aggregate)));
    }
    Ok(())
}

#[test]
fn rejects_malformed_expressions() -> AppResult<()> {
    for expr in [
        "error_rate rate<0.5",
        ": rate<0.5",
        "error rate: rate<0.5",
        "error_rate: rate 0.5",
        "error_rate: rate=0.5",
        "error_rate: <0.5",
        "error_rate: rate<",
        "error_rate: mean<0.5",
        "error_rate: rate<abc",
        "error_rate: rate<-1",
        "error_rate: rate<0.5s",
        "http_req_duration: p(0)<10",
        "http_req_duration: p(101)<10",
        "http_req_duration: p(95<10",
        "http_req_duration: avg<10m",
    ] {
        expect_parse_error(expr)?;
    }
    Ok(())
}

#[test]
fn validate_checks_metric_and_kind() -> AppResult<()> {
    let sink = MetricSink::new();
    sink.register_rate("error_rate")?;
    sink.register_counter("http_reqs")?;
    sink.register_trend("http_req_duration")?;

    let good = parse_thresholds(&[
        "error_rate: rate<0.5",
        "http_reqs: count>0",
        "http_req_duration: p(95)<2000",
        "http_req_duration: count>0",
    ])?;
    validate(&good, &sink)?;

    let unknown = parse_thresholds(&["missing: rate<0.5"])?;
    if !matches!(
        validate(&unknown, &sink),
        Err(ThresholdError::UnknownMetric { .. })
    ) {
        return Err(AppError::validation("Expected unknown metric error"));
    }

    for expr in ["error_rate: avg<1", "http_reqs: rate<1", "http_req_duration: rate<1"] {
        let wrong_kind = parse_thresholds(&[expr])?;
        if !matches!(
            validate(&wrong_kind, &sink),
            Err(ThresholdError::IncompatibleAggregate { .. })
        ) {
            return Err(AppError::validation(format!(
                "Expected incompatible aggregate for '{}'",
                expr
            )));
        }
    }
    Ok(())
}

#[test]
fn error_rate_above_bound_fails_with_violation() -> AppResult<()> {
    let sink = MetricSink::new();
    let error_rate = sink.register_rate("error_rate")?;
    for index in 0..10 {
        error_rate.add(index < 6);
    }

    let thresholds = parse_thresholds(&["error_rate: rate<0.5"])?;
    let report = evaluate(&sink.snapshot(), &thresholds);
    if report.pass {
        return Err(AppError::validation("Expected the threshold to fail"));
    }
    if report.violations != vec!["error_rate: rate<0.5".to_owned()] {
        return Err(AppError::validation(format!(
            "Unexpected violations: {:?}",
            report.violations
        )));
    }
    let observed = report.results.first().and_then(|result| result.observed);
    if observed != Some(Ratio::new(6, 10)) {
        return Err(AppError::validation(format!("Unexpected observed value: {:?}", observed)));
    }
    Ok(())
}

#[test]
fn boundary_comparison_is_exact() -> AppResult<()> {
    let sink = MetricSink::new();
    let error_rate = sink.register_rate("error_rate")?;
    error_rate.add(true);
    error_rate.add(false);

    let thresholds = parse_thresholds(&["error_rate: rate<0.5", "error_rate: rate<=0.5", "error_rate: rate==0.50"])?;
    let report = evaluate(&sink.snapshot(), &thresholds);
    let passes: Vec<bool> = report.results.iter().map(|result| result.pass).collect();
    if passes != vec![false, true, true] {
        return Err(AppError::validation(format!("Unexpected results: {:?}", passes)));
    }
    Ok(())
}

#[test]
fn evaluates_every_threshold_and_missing_metric_fails() -> AppResult<()> {
    let sink = MetricSink::new();
    let duration = sink.register_trend("http_req_duration")?;
    let reqs = sink.register_counter("http_reqs")?;
    for millis in [10u64, 20, 30] {
        duration.add(Duration::from_millis(millis));
        reqs.add(1);
    }

    let thresholds = parse_thresholds(&[
        "absent: count>0",
        "http_req_duration: p(95)<2000",
        "http_req_duration: avg<1ms",
        "http_reqs: count==3",
    ])?;
    let report = evaluate(&sink.snapshot(), &thresholds);
    if report.results.len() != 4 {
        return Err(AppError::validation("Expected every threshold to be evaluated"));
    }
    let expected = vec!["absent: count>0".to_owned(), "http_req_duration: avg<1ms".to_owned()];
    if report.violations != expected {
        return Err(AppError::validation(format!(
            "Unexpected violations: {:?}",
            report.violations
        )));
    }
    if report.results.first().and_then(|result| result.observed).is_some() {
        return Err(AppError::validation("Missing metric must have no observed value"));
    }
    Ok(())
}

#[test]
fn empty_threshold_list_passes() -> AppResult<()> {
    let report = evaluate(&MetricSink::new().snapshot(), &[]);
    if !report.pass || !report.violations.is_empty() {
        return Err(AppError::validation("Expected an empty list to pass"));
    }
    Ok(())
}

#[test]
fn percentile_thresholds_rank_recorded_latencies() -> AppResult<()> {
    let sink = MetricSink::new();
    let duration = sink.register_trend("http_req_duration")?;
    for millis in 1..=100u64 {
        duration.add(Duration::from_millis(millis));
    }

    let thresholds = parse_thresholds(&[
        "http_req_duration: med<51",
        "http_req_duration: p(99)>=99",
        "http_req_duration: p(50)>51",
    ])?;
    let report = evaluate(&sink.snapshot(), &thresholds);
    if report.violations != vec!["http_req_duration: p(50)>51".to_owned()] {
        return Err(AppError::validation(format!(
            "Unexpected violations: {:?}",
            report.violations
        )));
    }
    Ok(())
}
