use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Duration must not be empty.")]
    DurationEmpty,
    #[error("Invalid duration '{value}'.")]
    InvalidDurationFormat { value: String },
    #[error("Invalid duration '{value}': {source}")]
    InvalidDurationNumber {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Duration overflow.")]
    DurationOverflow,
    #[error("Invalid duration unit '{unit}'.")]
    InvalidDurationUnit { unit: String },
    #[error("Duration must be > 0.")]
    DurationZero,
    #[error("Value must be >= {min}.")]
    ValueTooSmall { min: u64 },
    #[error("Invalid value: {source}")]
    InvalidNumber {
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Invalid base URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Base URL '{url}' is missing a host.")]
    BaseUrlMissingHost { url: String },
    #[error("Unsupported base URL scheme '{scheme}'. Use http or https.")]
    UnsupportedBaseUrlScheme { scheme: String },
    #[error("Scenario must include at least one step.")]
    StepsEmpty,
    #[error("Step path must not be empty.")]
    StepPathEmpty,
    #[error("Step path '{path}' must start with '/'.")]
    StepPathNotAbsolute { path: String },
    #[error("Step success statuses must not be empty.")]
    SuccessStatusesEmpty,
    #[error("Step sets both success_statuses and success_range.")]
    ConflictingSuccessPredicates,
    #[error("Invalid success status range {min}..{max}.")]
    InvalidStatusRange { min: u16, max: u16 },
    #[error("Unclosed template placeholder in '{template}'.")]
    UnclosedPlaceholder { template: String },
    #[error("Unknown template placeholder '{{{{{name}}}}}'. Use vu, iter, or rand:N.")]
    UnknownPlaceholder { name: String },
    #[error("Invalid rand bound in '{{{{{placeholder}}}}}'. Expected rand:N with N >= 1.")]
    InvalidRandBound { placeholder: String },
    #[error("Unknown scenario '{name}'. Use default or payment.")]
    UnknownScenario { name: String },
    #[error("Failed to build runtime: {source}")]
    RuntimeBuildFailed {
        #[source]
        source: std::io::Error,
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
