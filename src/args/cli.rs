use clap::Parser;
use std::time::Duration;

use crate::http::EndpointStep;

use super::defaults::DEFAULT_BASE_URL;
use super::parsers::{
    parse_duration_arg, parse_positive_u64, parse_positive_usize, parse_sleep_arg,
};
use super::types::{OutputFormat, PositiveU64, PositiveUsize, ScenarioName};
use crate::metrics::DEFAULT_ERROR_RATE;

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Constant-concurrency HTTP load generator with k6-style thresholds."
)]
pub struct RunArgs {
    /// Base URL of the target service
    #[arg(long = "base-url", short = 'u', env = "BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Number of concurrent virtual users
    #[arg(long, env = "VUS", default_value = "5", value_parser = parse_positive_usize)]
    pub vus: PositiveUsize,

    /// Run duration (supports ms/s/m/h and decimal seconds)
    #[arg(
        long,
        short = 't',
        env = "DURATION",
        default_value = "30s",
        value_parser = parse_duration_arg
    )]
    pub duration: Duration,

    /// Pause between iterations of one virtual user (defaults to the scenario's pause)
    #[arg(long = "iteration-sleep", env = "ITERATION_SLEEP", value_parser = parse_sleep_arg)]
    pub iteration_sleep: Option<Duration>,

    /// Stop after N iterations in total, shared by all virtual users
    #[arg(long = "iterations", value_parser = parse_positive_u64)]
    pub iterations: Option<PositiveU64>,

    /// Request timeout (supports ms/s/m/h)
    #[arg(long = "timeout", default_value = "30s", value_parser = parse_duration_arg)]
    pub request_timeout: Duration,

    /// Timeout for establishing a new connection (supports ms/s/m/h)
    #[arg(long = "connect-timeout", default_value = "5s", value_parser = parse_duration_arg)]
    pub connect_timeout: Duration,

    /// Threshold expression, e.g. "error_rate: rate<0.5" (repeatable)
    #[arg(long = "threshold")]
    pub thresholds: Vec<String>,

    /// Built-in scenario used when no steps are configured
    #[arg(long, default_value = "default", ignore_case = true)]
    pub scenario: ScenarioName,

    /// Name of the rate metric fed with one failure observation per request
    #[arg(long = "error-rate-metric", default_value = DEFAULT_ERROR_RATE)]
    pub error_rate_metric: String,

    /// Path to config file (TOML/JSON). Defaults to ./vuload.toml or ./vuload.json if present.
    #[arg(long)]
    pub config: Option<String>,

    /// Report format printed to stdout
    #[arg(long = "output-format", default_value = "text", ignore_case = true)]
    pub output_format: OutputFormat,

    /// Write the JSON report to this path as well
    #[arg(long = "summary-export")]
    pub summary_export: Option<String>,

    /// Enable verbose logging (sets log level to debug unless overridden by VULOAD_LOG/RUST_LOG)
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Disable colored log output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Steps loaded from the config file
    #[arg(skip)]
    pub steps: Option<Vec<EndpointStep>>,
}
