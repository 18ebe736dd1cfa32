use serde::{Deserialize, Serialize};

use crate::args::HttpMethod;
use crate::error::ValidationError;

use super::template::PathTemplate;

/// Lowest status counted as success by the default predicate.
const DEFAULT_SUCCESS_MIN: u16 = 200;
/// First status no longer counted as success by the default predicate.
const DEFAULT_SUCCESS_MAX: u16 = 400;

/// Decides whether a response status counts as a successful request.
/// Status 0 (no response) never succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuccessPredicate {
    /// `min <= status < max`
    StatusRange { min: u16, max: u16 },
    OneOf(Vec<u16>),
}

impl Default for SuccessPredicate {
    fn default() -> Self {
        SuccessPredicate::StatusRange {
            min: DEFAULT_SUCCESS_MIN,
            max: DEFAULT_SUCCESS_MAX,
        }
    }
}

impl SuccessPredicate {
    /// Builds a range predicate.
    ///
    /// # Errors
    ///
    /// Returns an error when `min >= max`.
    pub const fn range(min: u16, max: u16) -> Result<Self, ValidationError> {
        if min >= max {
            return Err(ValidationError::InvalidStatusRange { min, max });
        }
        Ok(SuccessPredicate::StatusRange { min, max })
    }

    /// Builds a predicate accepting exactly the listed statuses.
    ///
    /// # Errors
    ///
    /// Returns an error when the list is empty.
    pub fn one_of(statuses: Vec<u16>) -> Result<Self, ValidationError> {
        if statuses.is_empty() {
            return Err(ValidationError::SuccessStatusesEmpty);
        }
        Ok(SuccessPredicate::OneOf(statuses))
    }

    #[must_use]
    pub fn is_success(&self, status: u16) -> bool {
        if status == 0 {
            return false;
        }
        match self {
            SuccessPredicate::StatusRange { min, max } => (*min..*max).contains(&status),
            SuccessPredicate::OneOf(statuses) => statuses.contains(&status),
        }
    }
}

/// Decides whether a response feeds the error rate as a failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Every response rejected by the success predicate is an error.
    #[default]
    Unsuccessful,
    /// Only server errors (5xx) and missing responses are errors.
    ServerError,
}

/// Lowest status counted as a server error.
const SERVER_ERROR_MIN: u16 = 500;

impl ErrorPolicy {
    #[must_use]
    pub const fn is_error(self, success: bool, status: u16) -> bool {
        match self {
            ErrorPolicy::Unsuccessful => !success,
            ErrorPolicy::ServerError => status == 0 || status >= SERVER_ERROR_MIN,
        }
    }
}

/// One request of an iteration. Built once per run and shared read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointStep {
    pub name: String,
    pub method: HttpMethod,
    pub path: PathTemplate,
    pub success: SuccessPredicate,
    pub error_policy: ErrorPolicy,
    /// Counter incremented when the request succeeds.
    pub success_counter: Option<String>,
    /// Counter incremented when the request fails.
    pub failure_counter: Option<String>,
}

impl EndpointStep {
    /// Creates a step with the default success predicate, named after its path.
    ///
    /// # Errors
    ///
    /// Returns an error when the path is empty, relative, or has an invalid
    /// placeholder.
    pub fn new(method: HttpMethod, path: &str) -> Result<Self, ValidationError> {
        let trimmed = path.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::StepPathEmpty);
        }
        if !trimmed.starts_with('/') {
            return Err(ValidationError::StepPathNotAbsolute {
                path: trimmed.to_owned(),
            });
        }
        let template = PathTemplate::parse(trimmed)?;
        Ok(Self {
            name: default_step_name(trimmed),
            method,
            path: template,
            success: SuccessPredicate::default(),
            error_policy: ErrorPolicy::default(),
            success_counter: None,
            failure_counter: None,
        })
    }

    #[must_use]
    pub fn named(mut self, name: &str) -> Self {
        name.clone_into(&mut self.name);
        self
    }

    #[must_use]
    pub fn with_success(mut self, success: SuccessPredicate) -> Self {
        self.success = success;
        self
    }

    #[must_use]
    pub const fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    #[must_use]
    pub fn with_counters(mut self, on_success: Option<&str>, on_failure: Option<&str>) -> Self {
        self.success_counter = on_success.map(str::to_owned);
        self.failure_counter = on_failure.map(str::to_owned);
        self
    }
}

fn default_step_name(path: &str) -> String {
    let without_query = path.split_once('?').map_or(path, |(head, _)| head);
    without_query.to_owned()
}
