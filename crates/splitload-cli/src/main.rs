//! splitload: upload a directory tree to S3 or Google Cloud Storage by extension.
//!
//! Reads `config.ini` (or `--config`), performs one full run over the target
//! directory and exits. Per-file failures are logged to the console and to the
//! log file, and do not change the exit status unless `--strict` is given.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use splitload_cli::{init_tracing, print_json, Cli};
use splitload_core::{Config, RunSummary};
use splitload_pipeline::{RunOptions, TracingSink, UploadCoordinator};
use splitload_storage::create_backends;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let _log_guard = init_tracing(cli.log_file())?;

    let config = Config::load(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    let settings = cli.upload_settings(&config.upload)?;
    let directory = cli.directory()?;

    let backends = create_backends(&config).context("Failed to initialize storage backends")?;

    let options = RunOptions::from(&settings);
    let cancel = options.cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, waiting for in-flight uploads to finish");
            cancel.cancel();
        }
    });

    let coordinator =
        UploadCoordinator::new(config.routing_table(), backends, Arc::new(TracingSink))?
            .with_options(options);

    let outcomes = coordinator
        .run(&directory)
        .await
        .with_context(|| format!("Failed to walk {}", directory.display()))?;

    if cli.json {
        print_json(&outcomes)?;
    }

    let summary = RunSummary::from_outcomes(&outcomes);
    if cli.strict && summary.has_failures() {
        anyhow::bail!("{} of {} uploads failed", summary.failed, summary.total());
    }

    Ok(())
}
