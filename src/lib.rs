pub mod audio;
pub mod core;
pub mod logging;
pub mod output;
pub mod processors;
pub mod settings;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use crate::core::orchestrator::TranscriptionOrchestrator;
use crate::processors::gemini::GeminiClient;
use crate::settings::cli::Cli;
use crate::settings::credentials::resolve_api_key;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn execute(cli: Cli) -> Result<()> {
    let api_key = resolve_api_key(cli.api_key.as_deref())?;
    let job = cli.job();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    let client = Arc::new(GeminiClient::new(api_key, Some(cli.model)));
    let orchestrator = TranscriptionOrchestrator::new(client);

    let result = runtime.block_on(orchestrator.run_until_interrupted(&job, async {
        if tokio::signal::ctrl_c().await.is_err() {
            tracing::debug!("ctrl-c handler unavailable; running without interrupt support");
            std::future::pending::<()>().await;
        }
    }));
    // Gives an interrupted trim time to notice cancellation and remove its file.
    runtime.shutdown_timeout(SHUTDOWN_GRACE);

    let report = result?;
    tracing::debug!(?report, "job finished");
    tracing::info!(
        "Process completed successfully using {}!",
        orchestrator.model_name()
    );
    Ok(())
}
