use std::time::Duration;

use super::types::{PositiveU64, PositiveUsize};
use crate::error::{AppError, AppResult, ValidationError};

const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SECOND: u128 = 1_000_000_000;
const NANOS_PER_MINUTE: u128 = 60_000_000_000;
const NANOS_PER_HOUR: u128 = 3_600_000_000_000;
/// Fraction digits beyond nanosecond precision are rejected.
const MAX_FRACTION_DIGITS: usize = 9;

pub(super) fn parse_positive_u64(s: &str) -> AppResult<PositiveU64> {
    s.parse::<PositiveU64>().map_err(AppError::from)
}

pub(super) fn parse_positive_usize(s: &str) -> AppResult<PositiveUsize> {
    s.parse::<PositiveUsize>().map_err(AppError::from)
}

/// Parses a strictly positive duration (`30s`, `500ms`, `1.5`, `2m`, `1h`).
///
/// A bare number is read as seconds.
///
/// # Errors
///
/// Returns an error when the value is malformed or zero.
pub fn parse_duration_arg(s: &str) -> AppResult<Duration> {
    let duration = parse_duration_value(s)?;
    if duration.is_zero() {
        return Err(AppError::validation(ValidationError::DurationZero));
    }
    Ok(duration)
}

/// Parses a duration that may be zero (inter-iteration sleep).
///
/// # Errors
///
/// Returns an error when the value is malformed.
pub fn parse_sleep_arg(s: &str) -> AppResult<Duration> {
    parse_duration_value(s).map_err(AppError::from)
}

pub(crate) fn parse_duration_value(s: &str) -> Result<Duration, ValidationError> {
    let value = s.trim();
    if value.is_empty() {
        return Err(ValidationError::DurationEmpty);
    }

    let int_len = leading_digits(value);
    let (int_part, rest) = value.split_at(int_len);
    let (frac_part, unit_part) = rest
        .strip_prefix('.')
        .map_or(("", rest), |after_dot| after_dot.split_at(leading_digits(after_dot)));
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(ValidationError::InvalidDurationFormat {
            value: value.to_owned(),
        });
    }
    if frac_part.len() > MAX_FRACTION_DIGITS {
        return Err(ValidationError::InvalidDurationFormat {
            value: value.to_owned(),
        });
    }

    let unit_nanos = match unit_part.trim() {
        "ms" => NANOS_PER_MILLI,
        "" | "s" => NANOS_PER_SECOND,
        "m" => NANOS_PER_MINUTE,
        "h" => NANOS_PER_HOUR,
        unit => {
            return Err(ValidationError::InvalidDurationUnit {
                unit: unit.to_owned(),
            });
        }
    };

    let whole = parse_digits(int_part, value)?;
    let fraction = parse_digits(frac_part, value)?;
    let fraction_scale = 10u128.saturating_pow(u32::try_from(frac_part.len()).unwrap_or(0));

    let whole_nanos = whole
        .checked_mul(unit_nanos)
        .ok_or(ValidationError::DurationOverflow)?;
    let fraction_nanos = fraction
        .checked_mul(unit_nanos)
        .and_then(|scaled| scaled.checked_div(fraction_scale))
        .ok_or(ValidationError::DurationOverflow)?;
    let total = whole_nanos
        .checked_add(fraction_nanos)
        .ok_or(ValidationError::DurationOverflow)?;
    let nanos = u64::try_from(total).map_err(|_err| ValidationError::DurationOverflow)?;

    Ok(Duration::from_nanos(nanos))
}

fn leading_digits(value: &str) -> usize {
    value
        .chars()
        .take_while(char::is_ascii_digit)
        .count()
}

fn parse_digits(digits: &str, value: &str) -> Result<u128, ValidationError> {
    if digits.is_empty() {
        return Ok(0);
    }
    let parsed: u64 = digits
        .parse()
        .map_err(|err| ValidationError::InvalidDurationNumber {
            value: value.to_owned(),
            source: err,
        })?;
    Ok(u128::from(parsed))
}
