use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::args::{RunArgs, ScenarioName, default_thresholds};
use crate::error::ValidationError;
use crate::http::EndpointStep;

use super::scenario::{builtin_iteration_sleep, builtin_steps};

/// Extra time on top of the request timeout before stuck virtual users are
/// aborted.
pub const DRAIN_GRACE: Duration = Duration::from_secs(2);

/// Immutable parameters of one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub base_url: Url,
    pub vus: usize,
    pub duration: Duration,
    pub iteration_sleep: Duration,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub max_iterations: Option<u64>,
    pub steps: Arc<[EndpointStep]>,
    /// Built-in scenario the steps came from; `None` for configured steps.
    pub scenario: Option<ScenarioName>,
    pub thresholds: Vec<String>,
    pub error_rate_metric: String,
}

impl RunConfig {
    /// Resolves CLI/config values into a run configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the base URL is invalid or the step list is empty.
    pub fn from_args(args: &RunArgs) -> Result<Self, ValidationError> {
        let base_url = parse_base_url(&args.base_url)?;

        let (steps, scenario) = match args.steps.as_ref() {
            Some(steps) => (steps.clone(), None),
            None => (builtin_steps(args.scenario)?, Some(args.scenario)),
        };
        if steps.is_empty() {
            return Err(ValidationError::StepsEmpty);
        }

        let iteration_sleep = args
            .iteration_sleep
            .unwrap_or_else(|| builtin_iteration_sleep(scenario.unwrap_or(args.scenario)));

        let thresholds = if args.thresholds.is_empty() {
            default_thresholds(&args.error_rate_metric)
        } else {
            args.thresholds.clone()
        };

        Ok(Self {
            base_url,
            vus: args.vus.get(),
            duration: args.duration,
            iteration_sleep,
            request_timeout: args.request_timeout,
            connect_timeout: args.connect_timeout,
            max_iterations: args.iterations.map(|limit| limit.get()),
            steps: Arc::from(steps),
            scenario,
            thresholds,
            error_rate_metric: args.error_rate_metric.clone(),
        })
    }

    /// Time granted after stop before remaining virtual users are aborted.
    #[must_use]
    pub const fn drain_timeout(&self) -> Duration {
        self.request_timeout.saturating_add(DRAIN_GRACE)
    }
}

/// Parses and checks the target base URL.
///
/// # Errors
///
/// Returns an error when the URL does not parse, is not http(s), or has no
/// host.
pub fn parse_base_url(raw: &str) -> Result<Url, ValidationError> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed).map_err(|err| ValidationError::InvalidBaseUrl {
        url: trimmed.to_owned(),
        source: err,
    })?;
    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(ValidationError::UnsupportedBaseUrlScheme {
                scheme: other.to_owned(),
            });
        }
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(ValidationError::BaseUrlMissingHost {
            url: trimmed.to_owned(),
        });
    }
    Ok(url)
}
