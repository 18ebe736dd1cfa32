use thiserror::Error;

use crate::metrics::MetricKind;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Metric '{name}' is already registered.")]
    DuplicateMetric { name: String },
    #[error("Invalid metric name '{name}'. Use letters, digits, '_' or '.'.")]
    InvalidMetricName { name: String },
    #[error("Metric '{name}' is not registered.")]
    UnknownMetric { name: String },
    #[error("Metric '{name}' is a {actual}, expected a {expected}.")]
    WrongMetricKind {
        name: String,
        expected: MetricKind,
        actual: MetricKind,
    },
    #[error("Histogram error during {context}: {source}")]
    Histogram {
        context: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[cfg(test)]
    #[error("Test expectation failed: {message}")]
    TestExpectation { message: &'static str },
    #[cfg(test)]
    #[error("Test expectation failed: {message}: {value}")]
    TestExpectationValue {
        message: &'static str,
        value: String,
    },
}
