//! Threshold expressions (`metric: aggregate op bound`) checked against the
//! final metrics snapshot.
mod evaluate;
mod parse;
mod types;

#[cfg(test)]
mod tests;

pub use evaluate::{evaluate, validate};
pub use parse::{parse_threshold, parse_thresholds};
pub use types::{Aggregate, Comparison, ThresholdExpr, ThresholdReport, ThresholdResult};
