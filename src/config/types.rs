use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::args::{HttpMethod, OutputFormat, ScenarioName, parse_duration_value};
use crate::error::ValidationError;
use crate::http::{EndpointStep, ErrorPolicy, SuccessPredicate};

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub base_url: Option<String>,
    pub vus: Option<usize>,
    pub duration: Option<DurationValue>,
    pub iteration_sleep: Option<DurationValue>,
    pub timeout: Option<DurationValue>,
    pub connect_timeout: Option<DurationValue>,
    pub iterations: Option<u64>,
    pub scenario: Option<ScenarioName>,
    pub error_rate_metric: Option<String>,
    pub output_format: Option<OutputFormat>,
    pub summary_export: Option<String>,
    pub no_color: Option<bool>,
    /// Conditions keyed by metric name, e.g. `error_rate = ["rate<0.5"]`.
    pub thresholds: Option<BTreeMap<String, ThresholdList>>,
    pub steps: Option<Vec<StepConfig>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ThresholdList {
    One(String),
    Many(Vec<String>),
}

impl ThresholdList {
    #[must_use]
    pub fn conditions(&self) -> Vec<&str> {
        match self {
            ThresholdList::One(condition) => vec![condition.as_str()],
            ThresholdList::Many(conditions) => conditions.iter().map(String::as_str).collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StepConfig {
    pub name: Option<String>,
    pub method: Option<HttpMethod>,
    pub path: String,
    /// Statuses counted as success; the 200..400 range when absent.
    pub success_statuses: Option<Vec<u16>>,
    /// `[min, max]`: statuses `min <= status < max` count as success.
    pub success_range: Option<[u16; 2]>,
    /// Which responses feed the error rate; `unsuccessful` when absent.
    pub error_policy: Option<ErrorPolicy>,
    pub success_counter: Option<String>,
    pub failure_counter: Option<String>,
}

impl StepConfig {
    /// Builds the endpoint step this entry describes. Method defaults to GET.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid path, an empty status list, an empty
    /// range, or both a status list and a range.
    pub fn to_step(&self) -> Result<EndpointStep, ValidationError> {
        let mut step = EndpointStep::new(self.method.unwrap_or(HttpMethod::Get), &self.path)?;
        if let Some(name) = self.name.as_deref() {
            step = step.named(name);
        }
        match (self.success_statuses.as_ref(), self.success_range) {
            (Some(_), Some(_)) => return Err(ValidationError::ConflictingSuccessPredicates),
            (Some(statuses), None) => {
                step = step.with_success(SuccessPredicate::one_of(statuses.clone())?);
            }
            (None, Some([min, max])) => {
                step = step.with_success(SuccessPredicate::range(min, max)?);
            }
            (None, None) => {}
        }
        if let Some(policy) = self.error_policy {
            step = step.with_error_policy(policy);
        }
        Ok(step.with_counters(
            self.success_counter.as_deref(),
            self.failure_counter.as_deref(),
        ))
    }
}

/// Duration given as seconds (`30`, `0.5`) or as text (`"500ms"`, `"1.5s"`).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    FractionalSeconds(f64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self) -> Result<Duration, ValidationError> {
        match self {
            DurationValue::Seconds(secs) => Ok(Duration::from_secs(*secs)),
            DurationValue::FractionalSeconds(secs) => Duration::try_from_secs_f64(*secs)
                .map_err(|_err| ValidationError::InvalidDurationFormat {
                    value: secs.to_string(),
                }),
            DurationValue::Text(text) => parse_duration_value(text),
        }
    }

    pub(crate) fn to_positive_duration(&self) -> Result<Duration, ValidationError> {
        let duration = self.to_duration()?;
        if duration.is_zero() {
            return Err(ValidationError::DurationZero);
        }
        Ok(duration)
    }
}
