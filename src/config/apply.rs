use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::{PositiveU64, PositiveUsize, RunArgs};
use crate::error::{AppError, AppResult, ConfigError, ValidationError};

use super::types::ConfigFile;

/// Applies configuration values to CLI arguments. Values given on the
/// command line or through the environment win over the file.
///
/// # Errors
///
/// Returns an error when config values are invalid.
pub fn apply_config(args: &mut RunArgs, matches: &ArgMatches, config: &ConfigFile) -> AppResult<()> {
    if !is_explicit(matches, "base_url")
        && let Some(base_url) = config.base_url.clone()
    {
        args.base_url = base_url;
    }

    if !is_explicit(matches, "vus")
        && let Some(vus) = config.vus
    {
        args.vus = PositiveUsize::try_from(vus).map_err(|err| invalid_field("vus", err))?;
    }

    if !is_explicit(matches, "duration")
        && let Some(duration) = config.duration.as_ref()
    {
        args.duration = duration
            .to_positive_duration()
            .map_err(|err| invalid_field("duration", err))?;
    }

    if !is_explicit(matches, "iteration_sleep")
        && let Some(sleep) = config.iteration_sleep.as_ref()
    {
        args.iteration_sleep = Some(
            sleep
                .to_duration()
                .map_err(|err| invalid_field("iteration_sleep", err))?,
        );
    }

    if !is_explicit(matches, "request_timeout")
        && let Some(timeout) = config.timeout.as_ref()
    {
        args.request_timeout = timeout
            .to_positive_duration()
            .map_err(|err| invalid_field("timeout", err))?;
    }

    if !is_explicit(matches, "connect_timeout")
        && let Some(timeout) = config.connect_timeout.as_ref()
    {
        args.connect_timeout = timeout
            .to_positive_duration()
            .map_err(|err| invalid_field("connect_timeout", err))?;
    }

    if !is_explicit(matches, "iterations")
        && let Some(iterations) = config.iterations
    {
        args.iterations = Some(
            PositiveU64::try_from(iterations).map_err(|err| invalid_field("iterations", err))?,
        );
    }

    if !is_explicit(matches, "scenario")
        && let Some(scenario) = config.scenario
    {
        args.scenario = scenario;
    }

    if !is_explicit(matches, "error_rate_metric")
        && let Some(metric) = config.error_rate_metric.clone()
    {
        args.error_rate_metric = metric;
    }

    if !is_explicit(matches, "output_format")
        && let Some(format) = config.output_format
    {
        args.output_format = format;
    }

    if !is_explicit(matches, "summary_export")
        && let Some(path) = config.summary_export.clone()
    {
        args.summary_export = Some(path);
    }

    if !is_explicit(matches, "no_color")
        && let Some(no_color) = config.no_color
    {
        args.no_color = no_color;
    }

    if !is_explicit(matches, "thresholds")
        && let Some(thresholds) = config.thresholds.as_ref()
    {
        let mut expressions = Vec::new();
        for (metric, list) in thresholds {
            let conditions = list.conditions();
            if conditions.is_empty() {
                return Err(AppError::config(ConfigError::EmptyThresholdList {
                    metric: metric.clone(),
                }));
            }
            for condition in conditions {
                expressions.push(format!("{}: {}", metric, condition.trim()));
            }
        }
        args.thresholds = expressions;
    }

    if let Some(steps) = config.steps.as_ref() {
        let mut parsed = Vec::with_capacity(steps.len());
        for (index, step) in steps.iter().enumerate() {
            let step = step.to_step().map_err(|err| {
                AppError::config(ConfigError::InvalidStep {
                    index: index.saturating_add(1),
                    source: err,
                })
            })?;
            parsed.push(step);
        }
        if parsed.is_empty() {
            return Err(AppError::validation(ValidationError::StepsEmpty));
        }
        args.steps = Some(parsed);
    }

    Ok(())
}

fn is_explicit(matches: &ArgMatches, name: &str) -> bool {
    matches!(
        matches.value_source(name),
        Some(ValueSource::CommandLine | ValueSource::EnvVariable)
    )
}

fn invalid_field(field: &'static str, source: ValidationError) -> AppError {
    AppError::config(ConfigError::InvalidField { field, source })
}
