//! CLI entry point for the catalog scraper.

use std::io::{self, IsTerminal};

use anyhow::{Context, Result};
use catalog_scraper_core::{PipelineContext, RunOutcome, ScrapeSession};
use clap::Parser;
use tracing::{debug, info, warn};

mod app_config;
mod cli;
mod output;
mod terminal;

use cli::Args;
use output::{OutputMode, ProgressPrinter};

const FINISHED_MESSAGE: &str = "Scraping finished or stopped.";

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let dumb_terminal = terminal::is_dumb_terminal();
    terminal::init_tracing(
        terminal::default_log_level(args.quiet, args.verbose),
        terminal::no_color_env_requested() || dumb_terminal,
    );
    debug!(?args, "CLI arguments parsed");

    let file_config = if args.no_config {
        None
    } else {
        app_config::load_default_file_config()?
    };
    let config = app_config::resolve_scraper_config(&args, file_config.as_ref());
    debug!(?config, "resolved scraper configuration");

    let ctx = PipelineContext::from_config(&config).context("Invalid scraper configuration")?;
    let mode = OutputMode::for_run(args.json, ctx.concurrency());
    let session = ScrapeSession::new();
    let handle = session.start(ctx)?;

    let cancel = handle.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, stopping after links in flight");
            cancel.cancel();
        }
    });

    let use_bar = terminal::should_use_progress_bar(
        io::stderr().is_terminal(),
        args.quiet,
        args.json,
        dumb_terminal,
    );
    let mut printer = ProgressPrinter::new(mode, use_bar);

    let (mut progress, run) = handle.into_parts();
    while let Some(event) = progress.next_event().await {
        if let Err(error) = printer.handle(&event) {
            run.cancel();
            printer.finish();
            return Err(error.context("Failed to write progress"));
        }
    }
    printer.finish();

    let result = run.join().await;
    if mode != OutputMode::Json {
        if let Err(error) = &result {
            println!("An error occurred: {error}");
        }
        println!("{FINISHED_MESSAGE}");
    }

    match result? {
        RunOutcome::Completed(stats) | RunOutcome::Cancelled(stats) => info!(
            processed = stats.processed(),
            saved = stats.saved(),
            skipped = stats.skipped(),
            download_failed = stats.download_failed(),
            details_failed = stats.details_failed(),
            "run summary"
        ),
        RunOutcome::NoLinks => info!("nothing to scrape"),
    }
    Ok(())
}
