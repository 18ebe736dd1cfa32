use crate::metrics::Ratio;
use crate::threshold::Aggregate;

const MICROS_PER_MILLI: u128 = 1_000;
/// Decimals shown for latencies in milliseconds.
const MS_DECIMALS: u32 = 2;
/// Decimals shown for rate observations.
const RATE_DECIMALS: u32 = 4;

/// Renders `value` with exactly `decimals` fraction digits, truncating.
#[must_use]
pub fn format_fixed(value: Ratio, decimals: u32) -> String {
    let scaled = value.fixed(decimals);
    if decimals == 0 {
        return scaled.to_string();
    }
    let scale = 10u128.saturating_pow(decimals);
    let whole = scaled.checked_div(scale).unwrap_or(0);
    let fraction = scaled.checked_rem(scale).unwrap_or(0);
    let width = usize::try_from(decimals).unwrap_or(0);
    format!("{}.{:0width$}", whole, fraction, width = width)
}

/// Renders a microsecond value as milliseconds, e.g. `12.34ms`.
#[must_use]
pub fn format_ms(micros: Ratio) -> String {
    format!("{}ms", format_fixed(micros.divided(MICROS_PER_MILLI), MS_DECIMALS))
}

/// Renders a threshold observation in the unit of its aggregate.
#[must_use]
pub fn format_observed(aggregate: Aggregate, observed: Option<Ratio>) -> String {
    let Some(value) = observed else {
        return "metric missing".to_owned();
    };
    if aggregate.is_time() {
        return format_ms(value);
    }
    match aggregate {
        Aggregate::Rate => format_fixed(value, RATE_DECIMALS),
        Aggregate::Count
        | Aggregate::Avg
        | Aggregate::Min
        | Aggregate::Max
        | Aggregate::Med
        | Aggregate::Percentile(_) => format_fixed(value, 0),
    }
}

/// Percentage of `passes / total` with two decimals, e.g. `12.50%`.
pub(super) fn format_percent(passes: u64, total: u64) -> String {
    let ratio = Ratio::new(u128::from(passes), u128::from(total)).scaled(100);
    format!("{}%", format_fixed(ratio, 2))
}
