//! HTTP request execution for endpoint steps.
mod client;
mod executor;
mod step;
mod template;

#[cfg(test)]
mod tests;

pub use client::build_client;
#[cfg(test)]
pub(crate) use executor::resolve_url;
pub use executor::{Outcome, RequestExecutor};
pub use step::{EndpointStep, ErrorPolicy, SuccessPredicate};
pub use template::{PathTemplate, TemplateVars};
