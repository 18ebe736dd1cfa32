use thiserror::Error;

/// Failure of one virtual-user iteration. Caught by the scheduler, logged and
/// counted; it never ends the run.
#[derive(Debug, Error)]
pub enum IterationError {
    #[error("VU {vu} iteration panicked: {message}")]
    Panicked { vu: u64, message: String },
    /// For [`crate::scheduler::Iteration`] implementors whose step cannot
    /// continue. The built-in scenario records request failures as metrics
    /// and never returns it.
    #[error("VU {vu} step '{step}' failed: {reason}")]
    Step {
        vu: u64,
        step: String,
        reason: String,
    },
}
