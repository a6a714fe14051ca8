// src/main.rs

use anyhow::Context;
use clap::Parser;
use refactoring_metrics::assembler::MetricsOptions;
use refactoring_metrics::batch::{read_repository_list, run_batch, BatchConfig};
use refactoring_metrics::cli::Args;
use refactoring_metrics::logging::Logging;
use refactoring_metrics::process::ProcessOptions;
use std::process::ExitCode;
use std::time::Instant;

fn main() -> ExitCode {
    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let start_time = Instant::now();

    let logging = Logging::init(&args.log_file, &args.log_level)
        .with_context(|| format!("cannot open log file {}", args.log_file.display()))?;
    let targets = read_repository_list(&args.repo_list)
        .with_context(|| format!("cannot read repository list {}", args.repo_list.display()))?;

    let config = BatchConfig {
        clone_dir: args.clone_dir,
        output_dir: args.output_dir,
        jobs: args.jobs,
        clone_missing: !args.no_clone,
        metrics: MetricsOptions {
            extensions: args.extensions,
            process: ProcessOptions {
                rexp_window_days: args.rexp_window_days,
                rexp_anchor: args.rexp_anchor,
                now: chrono::Utc::now().timestamp(),
            },
        },
    };

    tracing::dispatcher::with_default(logging.dispatch(), || {
        tracing::info!(repositories = targets.len(), "batch started");
    });
    let outcome = run_batch(&targets, &config, logging.dispatch());
    tracing::dispatcher::with_default(logging.dispatch(), || match &outcome {
        Ok(summary) => tracing::info!(
            repositories = summary.repositories,
            failed = summary.failed,
            records = summary.records,
            "batch finished"
        ),
        Err(e) => tracing::error!(error = %e, "batch aborted"),
    });
    logging.shutdown().context("cannot flush log file")?;
    let summary = outcome.context("batch aborted")?;

    println!(
        "Metrics data has been saved: {} records from {} repositories ({} failed, see {}) in {:.2?}.",
        summary.records,
        summary.repositories,
        summary.failed,
        args.log_file.display(),
        start_time.elapsed()
    );
    Ok(())
}
