mod app;
mod config;
mod http;
mod iteration;
mod metrics;
mod threshold;
mod validation;

#[cfg(test)]
mod test_support;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use http::{HttpError, NetworkError, NetworkErrorKind};
pub use iteration::IterationError;
pub use metrics::MetricsError;
pub use threshold::ThresholdError;
pub use validation::ValidationError;
