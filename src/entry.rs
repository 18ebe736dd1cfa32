use std::process::ExitCode;

use clap::{CommandFactory, FromArgMatches};
use tracing::{error, info};

use crate::args::RunArgs;
use crate::config::{apply_config, load_config};
use crate::error::{AppError, AppResult, ValidationError};
use crate::logger::init_logging;
use crate::report::{export_summary, print_report};
use crate::runner::{RunConfig, RunController};
use crate::shutdown_handlers::{setup_signal_shutdown_handler, shutdown_channel};

/// Exit code for invalid input or any failure before the run produced a
/// verdict.
const EXIT_SETUP_FAILED: u8 = 2;

/// Runs the CLI: parse arguments, apply the config file, run, report.
///
/// Exit code 0 means every threshold passed, 1 that at least one was
/// violated, 2 a setup or internal error.
#[must_use]
pub fn run() -> ExitCode {
    match run_cli() {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            error!("{}", err);
            ExitCode::from(EXIT_SETUP_FAILED)
        }
    }
}

fn run_cli() -> AppResult<u8> {
    let matches = RunArgs::command().get_matches();
    let mut args = RunArgs::from_arg_matches(&matches)?;

    let applied = load_config(args.config.as_deref()).and_then(|config| {
        config.map_or(Ok(()), |config| apply_config(&mut args, &matches, &config))
    });
    init_logging(args.verbose, args.no_color);
    applied?;

    let config = RunConfig::from_args(&args)?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::validation(ValidationError::RuntimeBuildFailed { source: err }))?;

    runtime.block_on(async move {
        let (shutdown_tx, _) = shutdown_channel();
        let signal_handle = setup_signal_shutdown_handler(&shutdown_tx);

        let controller = RunController::new(config)?;
        let outcome = controller.run(&shutdown_tx).await?;

        signal_handle.abort();

        print_report(&outcome, args.output_format)?;
        if let Some(path) = args.summary_export.as_deref() {
            export_summary(path, &outcome).await?;
            info!("Summary written to {}", path);
        }
        Ok(outcome.exit_code())
    })
}
