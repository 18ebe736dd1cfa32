pub(crate) const DEFAULT_USER_AGENT: &str = concat!("vuload/", env!("CARGO_PKG_VERSION"));

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Latency threshold applied when neither the CLI nor the config declares any.
pub const DEFAULT_DURATION_THRESHOLD: &str = "http_req_duration: p(95)<2000";
/// Condition applied to the error-rate metric by default.
pub const DEFAULT_ERROR_RATE_CONDITION: &str = "rate<0.5";

/// Thresholds used when none are configured, keyed to the run's error-rate
/// metric.
#[must_use]
pub fn default_thresholds(error_rate_metric: &str) -> Vec<String> {
    vec![
        DEFAULT_DURATION_THRESHOLD.to_owned(),
        format!("{}: {}", error_rate_metric, DEFAULT_ERROR_RATE_CONDITION),
    ]
}
