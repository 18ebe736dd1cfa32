//! Core library for the `vuload` CLI.
//!
//! A constant-concurrency load generator: a fixed pool of virtual users loops
//! a scripted list of HTTP requests for a duration, records every outcome in
//! a thread-safe metric sink, and gates the run on k6-style thresholds. The
//! binary is a thin layer over [`runner::RunController`]; the scheduler,
//! metrics and threshold modules are usable on their own.
pub mod args;
pub mod config;
pub mod entry;
pub mod error;
pub mod http;
pub mod logger;
pub mod metrics;
pub mod report;
pub mod runner;
pub mod scheduler;
pub mod shutdown;
pub mod shutdown_handlers;
pub mod threshold;

#[cfg(feature = "fuzzing")]
pub mod fuzzing;
