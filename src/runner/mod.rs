//! Run controller: wires the metric sink, request executor, scheduler and
//! threshold evaluator into one run.
mod config;
mod controller;
mod iteration;
mod scenario;


pub use config::{DRAIN_GRACE, RunConfig, parse_base_url};
pub use controller::{RunController, RunOutcome, RunParameters};
pub use scenario::{builtin_iteration_sleep, builtin_steps};
