//! CLI argument types and parsers.
mod cli;
mod defaults;
pub mod parsers;
mod types;


pub use cli::RunArgs;
pub(crate) use defaults::DEFAULT_USER_AGENT;
pub use defaults::{
    DEFAULT_BASE_URL, DEFAULT_DURATION_THRESHOLD, DEFAULT_ERROR_RATE_CONDITION, default_thresholds,
};
pub use parsers::{parse_duration_arg, parse_sleep_arg};
pub(crate) use parsers::parse_duration_value;
pub use types::{HttpMethod, OutputFormat, PositiveU64, PositiveUsize, ScenarioName};
