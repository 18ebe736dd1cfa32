use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::LatencyHistogram;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Counter,
    Rate,
    Trend,
}

impl MetricKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Rate => "rate",
            MetricKind::Trend => "trend",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exact non-negative fraction. The denominator is never zero; equality and
/// ordering compare values, so `1/2 == 2/4`.
#[derive(Debug, Clone, Copy)]
pub struct Ratio {
    numerator: u128,
    denominator: u128,
}

impl Ratio {
    /// Builds `numerator / denominator`; a zero denominator yields `0`.
    #[must_use]
    pub const fn new(numerator: u128, denominator: u128) -> Self {
        if denominator == 0 {
            return Self {
                numerator: 0,
                denominator: 1,
            };
        }
        Self {
            numerator,
            denominator,
        }
    }

    #[must_use]
    pub const fn whole(value: u128) -> Self {
        Self::new(value, 1)
    }

    #[must_use]
    pub const fn numerator(self) -> u128 {
        self.numerator
    }

    #[must_use]
    pub const fn denominator(self) -> u128 {
        self.denominator
    }

    /// Multiplies by an integer factor (unit conversion).
    #[must_use]
    pub const fn scaled(self, factor: u128) -> Self {
        Self::new(self.numerator.saturating_mul(factor), self.denominator)
    }

    /// Divides by an integer factor (unit conversion).
    #[must_use]
    pub const fn divided(self, factor: u128) -> Self {
        Self::new(self.numerator, self.denominator.saturating_mul(factor))
    }

    /// Value multiplied by `10^decimals`, truncated.
    #[must_use]
    pub fn fixed(self, decimals: u32) -> u128 {
        let scale = 10u128.saturating_pow(decimals);
        self.numerator
            .saturating_mul(scale)
            .checked_div(self.denominator)
            .unwrap_or(0)
    }
}

impl Ord for Ratio {
    fn cmp(&self, other: &Self) -> Ordering {
        let left = self.numerator.saturating_mul(other.denominator);
        let right = other.numerator.saturating_mul(self.denominator);
        left.cmp(&right)
    }
}

impl PartialEq for Ratio {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ratio {}

impl PartialOrd for Ratio {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Point-in-time state of a trend metric, latencies in microseconds.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendSnapshot {
    pub count: u64,
    pub sum_us: u128,
    pub histogram: LatencyHistogram,
}

impl TrendSnapshot {
    #[must_use]
    pub fn avg_us(&self) -> Ratio {
        Ratio::new(self.sum_us, u128::from(self.count))
    }

    #[must_use]
    pub fn min_us(&self) -> u64 {
        self.histogram.min()
    }

    #[must_use]
    pub fn max_us(&self) -> u64 {
        self.histogram.max()
    }

    /// Latency at `rank` thousandths of a percent (`99_900` is p99.9).
    #[must_use]
    pub fn percentile_us(&self, rank: u32) -> u64 {
        self.histogram.percentile(rank)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    Counter { count: u64 },
    Rate { passes: u64, total: u64 },
    Trend(TrendSnapshot),
}

impl MetricValue {
    #[must_use]
    pub const fn kind(&self) -> MetricKind {
        match self {
            MetricValue::Counter { .. } => MetricKind::Counter,
            MetricValue::Rate { .. } => MetricKind::Rate,
            MetricValue::Trend(_) => MetricKind::Trend,
        }
    }

    /// Fraction of `true` observations for rates.
    #[must_use]
    pub fn rate(&self) -> Option<Ratio> {
        match self {
            MetricValue::Rate { passes, total } => {
                Some(Ratio::new(u128::from(*passes), u128::from(*total)))
            }
            MetricValue::Counter { .. } | MetricValue::Trend(_) => None,
        }
    }
}

/// Consistent read of every registered metric, ordered by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsSnapshot {
    pub metrics: BTreeMap<String, MetricValue>,
}

impl MetricsSnapshot {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&MetricValue> {
        self.metrics.get(name)
    }

    #[must_use]
    pub fn counter(&self, name: &str) -> Option<u64> {
        match self.metrics.get(name) {
            Some(MetricValue::Counter { count }) => Some(*count),
            Some(MetricValue::Rate { .. } | MetricValue::Trend(_)) | None => None,
        }
    }

    #[must_use]
    pub fn rate(&self, name: &str) -> Option<Ratio> {
        self.metrics.get(name).and_then(MetricValue::rate)
    }

    #[must_use]
    pub fn trend(&self, name: &str) -> Option<&TrendSnapshot> {
        match self.metrics.get(name) {
            Some(MetricValue::Trend(trend)) => Some(trend),
            Some(MetricValue::Counter { .. } | MetricValue::Rate { .. }) | None => None,
        }
    }
}
