use std::fmt;

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Failed to build HTTP client: {source}")]
    BuildClientFailed {
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to join '{path}' onto base URL '{base}': {source}")]
    JoinUrlFailed {
        base: String,
        path: String,
        #[source]
        source: url::ParseError,
    },
}

/// Transport-level failure of a single request.
///
/// Never propagated as an [`super::AppError`]; it travels inside an
/// [`crate::http::Outcome`] and is counted as a failed request.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize)]
#[error("{kind} error: {message}")]
pub struct NetworkError {
    pub kind: NetworkErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkErrorKind {
    Timeout,
    Connect,
    Request,
    Body,
}

impl NetworkErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            NetworkErrorKind::Timeout => "timeout",
            NetworkErrorKind::Connect => "connect",
            NetworkErrorKind::Request => "request",
            NetworkErrorKind::Body => "body",
        }
    }
}

impl fmt::Display for NetworkErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl NetworkError {
    #[must_use]
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            NetworkErrorKind::Timeout
        } else if err.is_connect() {
            NetworkErrorKind::Connect
        } else if err.is_body() || err.is_decode() {
            NetworkErrorKind::Body
        } else {
            NetworkErrorKind::Request
        };
        Self {
            kind,
            message: err.to_string(),
        }
    }
}
