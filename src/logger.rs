use tracing::Subscriber;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Environment variable read first for the log filter.
pub const LOG_ENV: &str = "VULOAD_LOG";

/// Installs the global tracing subscriber.
///
/// The filter comes from `VULOAD_LOG`, then `RUST_LOG`, else `debug` when
/// verbose and `info` otherwise. A second call leaves the first subscriber in
/// place and reports it on stderr.
pub fn init_logging(verbose: bool, no_color: bool) {
    if let Err(err) = tracing::subscriber::set_global_default(build_subscriber(verbose, no_color))
    {
        eprintln!("Failed to set global default subscriber: {}", err);
    }
}

/// Stderr subscriber with the filter [`init_logging`] would install.
#[must_use]
pub fn build_subscriber(verbose: bool, no_color: bool) -> impl Subscriber + Send + Sync + 'static {
    let configured = std::env::var(LOG_ENV)
        .or_else(|_| std::env::var("RUST_LOG"))
        .ok();
    FmtSubscriber::builder()
        .with_env_filter(resolve_filter(configured, verbose))
        .with_ansi(!no_color)
        .with_writer(std::io::stderr)
        .finish()
}

/// An unparsable configured filter falls back to the verbosity default.
fn resolve_filter(configured: Option<String>, verbose: bool) -> EnvFilter {
    configured
        .and_then(|value| EnvFilter::try_new(value).ok())
        .unwrap_or_else(|| default_filter(verbose))
}

fn default_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn filter_follows_verbosity_without_configuration() -> Result<(), String> {
        let quiet = resolve_filter(None, false).max_level_hint();
        if quiet != Some(LevelFilter::INFO) {
            return Err(format!("Expected info, got {:?}", quiet));
        }
        let verbose = resolve_filter(None, true).max_level_hint();
        if verbose != Some(LevelFilter::DEBUG) {
            return Err(format!("Expected debug, got {:?}", verbose));
        }
        Ok(())
    }

    #[test]
    fn configured_filter_wins_and_bad_values_fall_back() -> Result<(), String> {
        let configured = resolve_filter(Some("error".to_owned()), true).max_level_hint();
        if configured != Some(LevelFilter::ERROR) {
            return Err(format!("Expected error, got {:?}", configured));
        }
        let fallback = resolve_filter(Some("vuload=notalevel".to_owned()), false).max_level_hint();
        if fallback != Some(LevelFilter::INFO) {
            return Err(format!("Expected info fallback, got {:?}", fallback));
        }
        Ok(())
    }

    #[test]
    fn subscriber_installs_only_for_the_scope() {
        tracing::subscriber::with_default(build_subscriber(false, true), || {
            tracing::debug!("filtered out below info");
        });
    }
}
