//! End-of-run report: text summary lines, JSON document and summary export.
mod format;
mod json;
mod text;


use crate::args::OutputFormat;
use crate::error::AppResult;
use crate::runner::RunOutcome;

pub use format::{format_fixed, format_ms, format_observed};
pub use json::{
    JsonMetric, JsonReport, JsonScheduler, JsonThreshold, export_summary, json_report,
};
pub use text::report_lines;

/// Prints the report to stdout in the requested format.
///
/// # Errors
///
/// Returns an error when the JSON report cannot be serialized.
pub fn print_report(outcome: &RunOutcome, format: OutputFormat) -> AppResult<()> {
    match format {
        OutputFormat::Text => {
            for line in report_lines(outcome) {
                println!("{}", line);
            }
        }
        OutputFormat::Json => {
            let report = json_report(outcome);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Quiet => {}
    }
    Ok(())
}
