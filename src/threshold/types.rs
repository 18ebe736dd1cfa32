use std::cmp::Ordering;
use std::fmt;

use crate::metrics::{MetricKind, MetricValue, Ratio};

/// Per-mille scale used to store percentile ranks exactly (`p(99.9)` is 99_900).
pub(super) const PERCENTILE_SCALE: u32 = 1_000;
/// Rank of the median, in thousandths of a percent.
const MEDIAN_RANK: u32 = 50 * PERCENTILE_SCALE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    Rate,
    Count,
    Avg,
    Min,
    Max,
    Med,
    /// Percentile rank in thousandths of a percent.
    Percentile(u32),
}

impl Aggregate {
    #[must_use]
    pub const fn supports(self, kind: MetricKind) -> bool {
        match kind {
            MetricKind::Counter => matches!(self, Aggregate::Count),
            MetricKind::Rate => matches!(self, Aggregate::Rate),
            MetricKind::Trend => !matches!(self, Aggregate::Rate),
        }
    }

    /// Whether the aggregate is a latency, so its bound carries a time unit.
    #[must_use]
    pub const fn is_time(self) -> bool {
        matches!(
            self,
            Aggregate::Avg
                | Aggregate::Min
                | Aggregate::Max
                | Aggregate::Med
                | Aggregate::Percentile(_)
        )
    }

    /// Observed value of this aggregate; time aggregates are in microseconds.
    #[must_use]
    pub fn observe(self, value: &MetricValue) -> Option<Ratio> {
        match (self, value) {
            (Aggregate::Count, MetricValue::Counter { count }) => {
                Some(Ratio::whole(u128::from(*count)))
            }
            (Aggregate::Rate, MetricValue::Rate { .. }) => value.rate(),
            (Aggregate::Count, MetricValue::Trend(trend)) => {
                Some(Ratio::whole(u128::from(trend.count)))
            }
            (Aggregate::Avg, MetricValue::Trend(trend)) => Some(trend.avg_us()),
            (Aggregate::Min, MetricValue::Trend(trend)) => {
                Some(Ratio::whole(u128::from(trend.min_us())))
            }
            (Aggregate::Max, MetricValue::Trend(trend)) => {
                Some(Ratio::whole(u128::from(trend.max_us())))
            }
            (Aggregate::Med, MetricValue::Trend(trend)) => {
                Some(Ratio::whole(u128::from(trend.percentile_us(MEDIAN_RANK))))
            }
            (Aggregate::Percentile(rank), MetricValue::Trend(trend)) => {
                Some(Ratio::whole(u128::from(trend.percentile_us(rank))))
            }
            (
                Aggregate::Rate,
                MetricValue::Counter { .. } | MetricValue::Trend(_),
            )
            | (
                Aggregate::Avg
                | Aggregate::Min
                | Aggregate::Max
                | Aggregate::Med
                | Aggregate::Percentile(_),
                MetricValue::Counter { .. } | MetricValue::Rate { .. },
            )
            | (Aggregate::Count, MetricValue::Rate { .. }) => None,
        }
    }
}

impl fmt::Display for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Aggregate::Rate => f.write_str("rate"),
            Aggregate::Count => f.write_str("count"),
            Aggregate::Avg => f.write_str("avg"),
            Aggregate::Min => f.write_str("min"),
            Aggregate::Max => f.write_str("max"),
            Aggregate::Med => f.write_str("med"),
            Aggregate::Percentile(rank) => {
                let whole = rank / PERCENTILE_SCALE;
                let fraction = rank % PERCENTILE_SCALE;
                if fraction == 0 {
                    write!(f, "p({})", whole)
                } else {
                    let digits = format!("{:03}", fraction);
                    write!(f, "p({}.{})", whole, digits.trim_end_matches('0'))
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl Comparison {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Comparison::Lt => "<",
            Comparison::Le => "<=",
            Comparison::Gt => ">",
            Comparison::Ge => ">=",
            Comparison::Eq => "==",
            Comparison::Ne => "!=",
        }
    }

    /// Applies the operator to `observed.cmp(&bound)`.
    #[must_use]
    pub const fn holds(self, ordering: Ordering) -> bool {
        match self {
            Comparison::Lt => matches!(ordering, Ordering::Less),
            Comparison::Le => !matches!(ordering, Ordering::Greater),
            Comparison::Gt => matches!(ordering, Ordering::Greater),
            Comparison::Ge => !matches!(ordering, Ordering::Less),
            Comparison::Eq => matches!(ordering, Ordering::Equal),
            Comparison::Ne => !matches!(ordering, Ordering::Equal),
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed threshold. Time bounds are normalised to microseconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThresholdExpr {
    pub source: String,
    pub metric: String,
    pub aggregate: Aggregate,
    pub op: Comparison,
    pub bound: Ratio,
}

impl fmt::Display for ThresholdExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThresholdResult {
    pub expr: ThresholdExpr,
    /// `None` when the metric was absent from the snapshot.
    pub observed: Option<Ratio>,
    pub pass: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThresholdReport {
    pub pass: bool,
    /// Source text of every failed expression, in evaluation order.
    pub violations: Vec<String>,
    pub results: Vec<ThresholdResult>,
}
