use super::*;
use crate::args::HttpMethod;
use crate::error::{AppError, AppResult, NetworkErrorKind, ValidationError};
use reqwest::Url;
use std::future::Future;
use std::io::{Read, Write};
use std::net::{Shutdown, TcpListener};
use std::thread;
use std::time::Duration;

fn run_async_test<F>(future: F) -> AppResult<()>
where
    F: Future<Output = AppResult<()>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::validation(format!("Failed to build runtime: {}", err)))?;
    runtime.block_on(future)
}

/// Serves `requests` connections with a fixed status, returning the base URL.
fn spawn_status_server(status_line: &'static str, requests: usize) -> AppResult<String> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    thread::spawn(move || {
        for _ in 0..requests {
            let Ok((mut stream, _)) = listener.accept() else {
                break;
            };
            let mut buffer = [0u8; 1024];
            if stream.read(&mut buffer).is_err() {
                continue;
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok",
                status_line
            );
            if stream.write_all(response.as_bytes()).is_err() {
                continue;
            }
            drop(stream.flush());
            drop(stream.shutdown(Shutdown::Both));
        }
    });
    Ok(format!("http://{}", addr))
}

fn vars() -> TemplateVars {
    TemplateVars {
        vu: 3,
        iteration: 7,
    }
}

fn parse_url(raw: &str) -> AppResult<Url> {
    Url::parse(raw).map_err(|err| AppError::validation(format!("bad url: {}", err)))
}

#[test]
fn template_renders_vu_iter_and_random_amount() -> AppResult<()> {
    let template = PathTemplate::parse("/payment?vu={{vu}}&iter={{ iter }}&amount={{rand:1000}}")?;
    for _ in 0..50 {
        let rendered = template.render(vars());
        let Some(amount) = rendered.strip_prefix("/payment?vu=3&iter=7&amount=") else {
            return Err(AppError::validation(format!("Unexpected render: {}", rendered)));
        };
        let value: u64 = amount
            .parse()
            .map_err(|err| AppError::validation(format!("amount not numeric: {}", err)))?;
        if value >= 1000 {
            return Err(AppError::validation(format!("amount out of range: {}", value)));
        }
    }
    Ok(())
}

#[test]
fn template_rejects_bad_placeholders() -> AppResult<()> {
    if !matches!(
        PathTemplate::parse("/x/{{vu"),
        Err(ValidationError::UnclosedPlaceholder { .. })
    ) {
        return Err(AppError::validation("Expected unclosed placeholder error"));
    }
    if !matches!(
        PathTemplate::parse("/x/{{user}}"),
        Err(ValidationError::UnknownPlaceholder { .. })
    ) {
        return Err(AppError::validation("Expected unknown placeholder error"));
    }
    if !matches!(
        PathTemplate::parse("/x/{{rand:0}}"),
        Err(ValidationError::InvalidRandBound { .. })
    ) {
        return Err(AppError::validation("Expected invalid rand bound error"));
    }
    Ok(())
}

#[test]
fn default_predicate_accepts_2xx_and_3xx_only() -> AppResult<()> {
    let predicate = SuccessPredicate::default();
    for status in [200, 204, 302, 399] {
        if !predicate.is_success(status) {
            return Err(AppError::validation(format!("{} should succeed", status)));
        }
    }
    for status in [0, 199, 400, 402, 500] {
        if predicate.is_success(status) {
            return Err(AppError::validation(format!("{} should fail", status)));
        }
    }
    Ok(())
}

#[test]
fn payment_predicate_accepts_declines() -> AppResult<()> {
    let predicate = SuccessPredicate::one_of(vec![200, 400, 402])?;
    if !predicate.is_success(402) || !predicate.is_success(400) {
        return Err(AppError::validation("Expected 400/402 to be accepted"));
    }
    if predicate.is_success(500) || predicate.is_success(0) {
        return Err(AppError::validation("Expected 500/0 to be rejected"));
    }
    if SuccessPredicate::one_of(Vec::new()).is_ok() {
        return Err(AppError::validation("Expected empty list to be rejected"));
    }
    if SuccessPredicate::range(400, 200).is_ok() {
        return Err(AppError::validation("Expected inverted range to be rejected"));
    }
    Ok(())
}

#[test]
fn step_requires_absolute_path() -> AppResult<()> {
    if EndpointStep::new(HttpMethod::Get, "io_task").is_ok() {
        return Err(AppError::validation("Expected relative path to be rejected"));
    }
    let step = EndpointStep::new(HttpMethod::Post, "/payment?amount={{rand:10}}")?;
    if step.name != "/payment" {
        return Err(AppError::validation(format!("Unexpected name: {}", step.name)));
    }
    Ok(())
}

#[test]
fn resolve_url_concatenates_base_and_path() -> AppResult<()> {
    let base = parse_url("http://localhost:8080")?;
    let url = resolve_url(&base, "/payment?amount=5")?;
    if url.as_str() != "http://localhost:8080/payment?amount=5" {
        return Err(AppError::validation(format!("Unexpected url: {}", url)));
    }

    let prefixed = parse_url("http://localhost:8080/api/")?;
    let nested = resolve_url(&prefixed, "/chain")?;
    if nested.as_str() != "http://localhost:8080/api/chain" {
        return Err(AppError::validation(format!("Unexpected url: {}", nested)));
    }
    Ok(())
}

#[test]
fn executor_reports_status_and_latency() -> AppResult<()> {
    run_async_test(async {
        let base = parse_url(&spawn_status_server("500 Internal Server Error", 1)?)?;
        let client = build_client(Duration::from_secs(5), Duration::from_secs(5))?;
        let executor = RequestExecutor::new(client);
        let step = EndpointStep::new(HttpMethod::Get, "/random_status")?;

        let outcome = executor.execute(&step, &base, vars()).await;
        if outcome.status != 500 {
            return Err(AppError::validation(format!("Unexpected status: {}", outcome.status)));
        }
        if outcome.error.is_some() {
            return Err(AppError::validation("Expected no network error"));
        }
        if outcome.is_success(&step.success) {
            return Err(AppError::validation("500 must not count as success"));
        }
        Ok(())
    })
}

#[test]
fn executor_turns_refused_connection_into_status_zero() -> AppResult<()> {
    run_async_test(async {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let addr = listener.local_addr()?;
        drop(listener);

        let base = parse_url(&format!("http://{}", addr))?;
        let client = build_client(Duration::from_secs(2), Duration::from_secs(1))?;
        let executor = RequestExecutor::new(client);
        let step = EndpointStep::new(HttpMethod::Post, "/payment?amount={{rand:1000}}")?;

        let outcome = executor.execute(&step, &base, vars()).await;
        if outcome.status != 0 {
            return Err(AppError::validation(format!("Unexpected status: {}", outcome.status)));
        }
        match outcome.error {
            Some(error) if matches!(error.kind, NetworkErrorKind::Connect | NetworkErrorKind::Request) => {
                Ok(())
            }
            other => Err(AppError::validation(format!("Unexpected error: {:?}", other))),
        }
    })
}

#[test]
fn executor_times_out_slow_server() -> AppResult<()> {
    run_async_test(async {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let addr = listener.local_addr()?;
        let holder = thread::spawn(move || {
            if let Ok((stream, _)) = listener.accept() {
                thread::sleep(Duration::from_millis(600));
                drop(stream);
            }
        });

        let base = parse_url(&format!("http://{}", addr))?;
        let client = build_client(Duration::from_millis(200), Duration::from_millis(200))?;
        let executor = RequestExecutor::new(client);
        let step = EndpointStep::new(HttpMethod::Get, "/random_sleep")?;

        let outcome = executor.execute(&step, &base, vars()).await;
        drop(holder.join());
        if outcome.status != 0 {
            return Err(AppError::validation("Expected status 0 on timeout"));
        }
        if outcome.error.map(|error| error.kind) != Some(NetworkErrorKind::Timeout) {
            return Err(AppError::validation("Expected timeout error kind"));
        }
        if outcome.latency >= Duration::from_millis(600) {
            return Err(AppError::validation("Timeout did not bound the request"));
        }
        Ok(())
    })
}
