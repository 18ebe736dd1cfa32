use std::time::Duration;

use crate::args::{HttpMethod, ScenarioName};
use crate::error::ValidationError;
use crate::http::{EndpointStep, ErrorPolicy, SuccessPredicate};

const PAYMENT_PATH: &str = "/payment?amount={{rand:1000}}";
const PAYMENT_SUCCESS_COUNTER: &str = "payment_success";
const PAYMENT_FAILURE_COUNTER: &str = "payment_failure";
/// Statuses the payment service answers for a processed payment, declines
/// included.
const PAYMENT_PROCESSED_STATUSES: [u16; 3] = [200, 400, 402];

const DEFAULT_SCENARIO_GETS: [&str; 6] = [
    "/",
    "/io_task",
    "/cpu_task",
    "/random_sleep",
    "/random_status",
    "/chain",
];

/// Pause between iterations of a built-in scenario.
#[must_use]
pub const fn builtin_iteration_sleep(scenario: ScenarioName) -> Duration {
    match scenario {
        ScenarioName::Default => Duration::from_millis(500),
        ScenarioName::Payment => Duration::from_millis(100),
    }
}

/// Steps of a built-in scenario.
///
/// # Errors
///
/// Returns an error if a built-in path fails to parse.
pub fn builtin_steps(scenario: ScenarioName) -> Result<Vec<EndpointStep>, ValidationError> {
    match scenario {
        ScenarioName::Default => {
            let mut steps = DEFAULT_SCENARIO_GETS
                .iter()
                .map(|path| EndpointStep::new(HttpMethod::Get, path))
                .collect::<Result<Vec<_>, _>>()?;
            steps.push(
                EndpointStep::new(HttpMethod::Post, PAYMENT_PATH)?
                    .named("payment")
                    .with_counters(Some(PAYMENT_SUCCESS_COUNTER), Some(PAYMENT_FAILURE_COUNTER)),
            );
            Ok(steps)
        }
        ScenarioName::Payment => {
            let processed = SuccessPredicate::one_of(PAYMENT_PROCESSED_STATUSES.to_vec())?;
            Ok(vec![
                EndpointStep::new(HttpMethod::Post, PAYMENT_PATH)?
                    .named("payment")
                    .with_success(processed)
                    .with_error_policy(ErrorPolicy::ServerError),
            ])
        }
    }
}
