use std::time::Duration;

use futures_util::StreamExt;
use reqwest::{Client, Url};
use tokio::time::Instant;

use crate::args::HttpMethod;
use crate::error::{HttpError, NetworkError, NetworkErrorKind};

use super::step::{EndpointStep, SuccessPredicate};
use super::template::TemplateVars;

/// Result of one request. `status` is 0 when no response was received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub status: u16,
    pub latency: Duration,
    pub error: Option<NetworkError>,
}

impl Outcome {
    #[must_use]
    pub fn is_success(&self, predicate: &SuccessPredicate) -> bool {
        self.error.is_none() && predicate.is_success(self.status)
    }

    fn network_failure(start: Instant, error: NetworkError) -> Self {
        Self {
            status: 0,
            latency: start.elapsed(),
            error: Some(error),
        }
    }
}

/// Issues exactly one HTTP request per call. Never records metrics and never
/// returns an error; transport failures come back as status 0.
#[derive(Debug, Clone)]
pub struct RequestExecutor {
    client: Client,
}

impl RequestExecutor {
    #[must_use]
    pub const fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn execute(
        &self,
        step: &EndpointStep,
        base_url: &Url,
        vars: TemplateVars,
    ) -> Outcome {
        let path = step.path.render(vars);
        let start = Instant::now();
        let url = match resolve_url(base_url, &path) {
            Ok(url) => url,
            Err(err) => {
                return Outcome::network_failure(
                    start,
                    NetworkError {
                        kind: NetworkErrorKind::Request,
                        message: err.to_string(),
                    },
                );
            }
        };

        let request = match step.method {
            HttpMethod::Get => self.client.get(url),
            HttpMethod::Post => self.client.post(url),
        };

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => return Outcome::network_failure(start, NetworkError::from_reqwest(&err)),
        };
        let status = response.status().as_u16();

        match drain_response_body(response).await {
            Ok(_) => Outcome {
                status,
                latency: start.elapsed(),
                error: None,
            },
            Err(err) => Outcome {
                status,
                latency: start.elapsed(),
                error: Some(NetworkError::from_reqwest(&err)),
            },
        }
    }
}

/// Appends a rendered path to the base URL the way string concatenation would:
/// a path prefix on the base is kept.
pub(crate) fn resolve_url(base_url: &Url, path: &str) -> Result<Url, HttpError> {
    let base = base_url.as_str().trim_end_matches('/');
    let joined = format!("{}{}", base, path);
    Url::parse(&joined).map_err(|err| HttpError::JoinUrlFailed {
        base: base_url.to_string(),
        path: path.to_owned(),
        source: err,
    })
}

async fn drain_response_body(response: reqwest::Response) -> Result<u64, reqwest::Error> {
    let mut stream = response.bytes_stream();
    let mut total_bytes: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let bytes = chunk?;
        total_bytes = total_bytes.saturating_add(u64::try_from(bytes.len()).unwrap_or(u64::MAX));
    }
    Ok(total_bytes)
}
