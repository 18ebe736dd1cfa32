//! Entry points for the `fuzz/` targets.
use std::time::Duration;

use clap::{ArgMatches, CommandFactory, FromArgMatches};

use crate::args::{PositiveU64, PositiveUsize, RunArgs, parse_duration_arg, parse_sleep_arg};
use crate::config::apply_config;
use crate::config::types::ConfigFile;
use crate::error::AppResult;
use crate::http::{PathTemplate, TemplateVars};

thread_local! {
    static BASE_MATCHES: ArgMatches = RunArgs::command().get_matches_from(["vuload"]);
}

/// Parses a strictly positive duration argument (e.g. `10s`, `1.5`).
///
/// # Errors
///
/// Returns an error when the duration is invalid or zero.
pub fn parse_duration_arg_input(input: &str) -> AppResult<Duration> {
    parse_duration_arg(input)
}

/// Parses an inter-iteration sleep, which may be zero.
///
/// # Errors
///
/// Returns an error when the duration is invalid.
pub fn parse_sleep_input(input: &str) -> AppResult<Duration> {
    parse_sleep_arg(input)
}

/// Parses a positive u64 string value.
///
/// # Errors
///
/// Returns an error when the value is invalid or zero.
pub fn parse_positive_u64_input(input: &str) -> AppResult<u64> {
    let value: PositiveU64 = input.parse()?;
    Ok(value.get())
}

/// Parses a positive usize string value.
///
/// # Errors
///
/// Returns an error when the value is invalid or zero.
pub fn parse_positive_usize_input(input: &str) -> AppResult<usize> {
    let value: PositiveUsize = input.parse()?;
    Ok(value.get())
}

/// Parses a path template and renders it once.
///
/// # Errors
///
/// Returns an error when the template is invalid.
pub fn render_path_input(input: &str, vu: u64, iteration: u64) -> AppResult<String> {
    let template = PathTemplate::parse(input)?;
    Ok(template.render(TemplateVars { vu, iteration }))
}

/// Parses TOML config and applies it to defaults.
///
/// # Errors
///
/// Returns an error when parsing or validation fails.
pub fn apply_config_from_toml(input: &str) -> AppResult<RunArgs> {
    let config: ConfigFile = toml::from_str(input)?;
    apply_config_to_defaults(&config)
}

/// Parses JSON config and applies it to defaults.
///
/// # Errors
///
/// Returns an error when parsing or validation fails.
pub fn apply_config_from_json(input: &[u8]) -> AppResult<RunArgs> {
    let config: ConfigFile = serde_json::from_slice(input)?;
    apply_config_to_defaults(&config)
}

fn apply_config_to_defaults(config: &ConfigFile) -> AppResult<RunArgs> {
    BASE_MATCHES.with(|matches| {
        let mut args = RunArgs::from_arg_matches(matches)?;
        apply_config(&mut args, matches, config)?;
        Ok(args)
    })
}
