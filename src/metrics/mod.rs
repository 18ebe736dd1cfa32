//! Thread-safe metric registry: counters, rates and latency trends.
mod histogram;
mod sink;
mod types;


pub use histogram::LatencyHistogram;
pub(crate) use sink::is_valid_metric_name;
pub use sink::{Counter, MetricSink, Rate, Trend};
pub use types::{MetricKind, MetricValue, MetricsSnapshot, Ratio, TrendSnapshot};

/// Total HTTP requests issued.
pub const HTTP_REQS: &str = "http_reqs";
/// Fraction of HTTP requests that failed their step's success predicate.
pub const HTTP_REQ_FAILED: &str = "http_req_failed";
/// Fraction of HTTP requests accepted by their step's success predicate.
pub const CHECKS: &str = "checks";
/// Request latency distribution.
pub const HTTP_REQ_DURATION: &str = "http_req_duration";
/// Completed iterations.
pub const ITERATIONS: &str = "iterations";
/// Iterations that returned an error or panicked.
pub const ITERATION_FAILURES: &str = "iteration_failures";
/// Iterations cut short by the stop condition.
pub const ITERATIONS_INTERRUPTED: &str = "iterations_interrupted";
/// Default name of the per-request error rate.
pub const DEFAULT_ERROR_RATE: &str = "error_rate";
