use crate::error::ThresholdError;
use crate::metrics::{Ratio, is_valid_metric_name};

use super::types::{Aggregate, Comparison, PERCENTILE_SCALE, ThresholdExpr};

const MICROS_PER_MILLI: u128 = 1_000;
const MICROS_PER_SECOND: u128 = 1_000_000;
/// Fraction digits accepted in a bound before the value stops being exact.
const MAX_FRACTION_DIGITS: usize = 18;

/// Parses `"metric: aggregate op bound"`, spaces optional.
///
/// Bounds of time aggregates default to milliseconds and may carry a `ms` or
/// `s` suffix.
///
/// # Errors
///
/// Returns an error naming the expression and the reason it was rejected.
pub fn parse_threshold(expr: &str) -> Result<ThresholdExpr, ThresholdError> {
    let source = expr.trim();
    let parse_error = |reason: &'static str| ThresholdError::Parse {
        expr: source.to_owned(),
        reason,
    };

    let (metric, condition) = source
        .split_once(':')
        .ok_or_else(|| parse_error("expected 'metric: condition'"))?;
    let metric = metric.trim();
    if metric.is_empty() {
        return Err(parse_error("missing metric name"));
    }
    if !is_valid_metric_name(metric) {
        return Err(parse_error("invalid metric name"));
    }

    let condition = condition.trim();
    let op_start = condition
        .find(['<', '>', '=', '!'])
        .ok_or_else(|| parse_error("missing comparison operator"))?;
    let (aggregate_text, op_and_bound) = condition.split_at(op_start);
    let (op, bound_text) = split_operator(op_and_bound)
        .ok_or_else(|| parse_error("unknown comparison operator"))?;

    let aggregate_text = aggregate_text.trim();
    if aggregate_text.is_empty() {
        return Err(parse_error("missing aggregate"));
    }
    let aggregate = parse_aggregate(aggregate_text).ok_or_else(|| parse_error("unknown aggregate"))?;

    let bound_text = bound_text.trim();
    if bound_text.is_empty() {
        return Err(parse_error("missing bound"));
    }
    let bound = parse_bound(bound_text, aggregate, source)?;

    Ok(ThresholdExpr {
        source: source.to_owned(),
        metric: metric.to_owned(),
        aggregate,
        op,
        bound,
    })
}

/// Parses every expression, stopping at the first malformed one.
///
/// # Errors
///
/// Returns the first parse error.
pub fn parse_thresholds<S>(exprs: &[S]) -> Result<Vec<ThresholdExpr>, ThresholdError>
where
    S: AsRef<str>,
{
    exprs.iter().map(|expr| parse_threshold(expr.as_ref())).collect()
}

fn split_operator(text: &str) -> Option<(Comparison, &str)> {
    const OPERATORS: [(&str, Comparison); 6] = [
        ("<=", Comparison::Le),
        (">=", Comparison::Ge),
        ("==", Comparison::Eq),
        ("!=", Comparison::Ne),
        ("<", Comparison::Lt),
        (">", Comparison::Gt),
    ];
    OPERATORS
        .iter()
        .find_map(|(token, op)| text.strip_prefix(token).map(|rest| (*op, rest)))
}

fn parse_aggregate(text: &str) -> Option<Aggregate> {
    match text {
        "rate" => return Some(Aggregate::Rate),
        "count" => return Some(Aggregate::Count),
        "avg" => return Some(Aggregate::Avg),
        "min" => return Some(Aggregate::Min),
        "max" => return Some(Aggregate::Max),
        "med" => return Some(Aggregate::Med),
        _ => {}
    }
    let rank_text = text.strip_prefix('p')?;
    let rank_text = rank_text
        .strip_prefix('(')
        .and_then(|inner| inner.strip_suffix(')'))
        .unwrap_or(rank_text)
        .trim();
    let rank = parse_decimal(rank_text)?;
    if rank.denominator() > u128::from(PERCENTILE_SCALE) {
        return None;
    }
    let scaled = rank.fixed(3);
    let max = u128::from(100 * PERCENTILE_SCALE);
    if scaled == 0 || scaled > max {
        return None;
    }
    u32::try_from(scaled).ok().map(Aggregate::Percentile)
}

fn parse_bound(text: &str, aggregate: Aggregate, expr: &str) -> Result<Ratio, ThresholdError> {
    let (number, unit) = split_unit(text);
    let invalid_bound = || ThresholdError::InvalidBound {
        expr: expr.to_owned(),
        bound: text.to_owned(),
    };
    let value = parse_decimal(number.trim()).ok_or_else(invalid_bound)?;

    if !aggregate.is_time() {
        if unit.is_some() {
            return Err(ThresholdError::Parse {
                expr: expr.to_owned(),
                reason: "time units only apply to latency aggregates",
            });
        }
        return Ok(value);
    }

    let micros = match unit {
        None | Some("ms") => value.scaled(MICROS_PER_MILLI),
        Some("s") => value.scaled(MICROS_PER_SECOND),
        Some(_) => return Err(invalid_bound()),
    };
    Ok(micros)
}

fn split_unit(text: &str) -> (&str, Option<&str>) {
    let unit_start = text
        .find(|ch: char| ch.is_ascii_alphabetic())
        .unwrap_or(text.len());
    let (number, unit) = text.split_at(unit_start);
    if unit.is_empty() {
        (number, None)
    } else {
        (number, Some(unit))
    }
}

/// Exact non-negative decimal: digits with an optional fractional part.
fn parse_decimal(text: &str) -> Option<Ratio> {
    let (whole, fraction) = text.split_once('.').unwrap_or((text, ""));
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if fraction.len() > MAX_FRACTION_DIGITS {
        return None;
    }
    if !whole.chars().chain(fraction.chars()).all(|ch| ch.is_ascii_digit()) {
        return None;
    }

    let mut numerator: u128 = 0;
    for digit in whole.bytes().chain(fraction.bytes()) {
        numerator = numerator
            .checked_mul(10)?
            .checked_add(u128::from(digit.checked_sub(b'0')?))?;
    }
    let exponent = u32::try_from(fraction.len()).ok()?;
    let denominator = 10u128.checked_pow(exponent)?;
    Some(Ratio::new(numerator, denominator))
}
