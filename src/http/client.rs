use std::time::Duration;

use reqwest::{Client, redirect};
use tracing::error;

use crate::args::DEFAULT_USER_AGENT;
use crate::error::{AppError, AppResult, HttpError};

/// Redirects followed before a response is returned as-is.
const REDIRECT_LIMIT: usize = 10;

/// Builds the HTTP client shared by every virtual user.
///
/// # Errors
///
/// Returns an error when the client cannot be built.
pub fn build_client(request_timeout: Duration, connect_timeout: Duration) -> AppResult<Client> {
    Client::builder()
        .timeout(request_timeout)
        .connect_timeout(connect_timeout)
        .user_agent(DEFAULT_USER_AGENT)
        .redirect(redirect::Policy::limited(REDIRECT_LIMIT))
        .build()
        .map_err(|err| {
            error!("Failed to build HTTP client: {}", err);
            AppError::http(HttpError::BuildClientFailed { source: err })
        })
}
