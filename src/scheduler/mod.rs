//! Constant-concurrency virtual-user scheduler.
//!
//! `start` spawns one task per virtual user. Each loops the iteration body
//! until the deadline passes, the shared iteration budget runs out, or a
//! shutdown is broadcast. Requests already in flight are allowed to finish;
//! tasks still running after the drain window are aborted.
mod control;
mod handle;
mod types;
mod vu;

#[cfg(test)]
mod tests;

pub use handle::{RunHandle, start};
pub use types::{IterationCounters, IterationStatus, SchedulerConfig, SchedulerStats};
pub use vu::{Iteration, VuContext};
