use thiserror::Error;

use crate::metrics::MetricKind;

#[derive(Debug, Error)]
pub enum ThresholdError {
    #[error("Invalid threshold '{expr}': {reason}.")]
    Parse { expr: String, reason: &'static str },
    #[error("Invalid threshold '{expr}': bound '{bound}' is not a number.")]
    InvalidBound { expr: String, bound: String },
    #[error("Threshold '{expr}' refers to unknown metric '{metric}'.")]
    UnknownMetric { expr: String, metric: String },
    #[error("Threshold '{expr}' uses '{aggregate}', which a {kind} metric does not support.")]
    IncompatibleAggregate {
        expr: String,
        aggregate: String,
        kind: MetricKind,
    },
}
