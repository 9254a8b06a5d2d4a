//! dir-sizer - Bounded-Concurrency Directory Size Aggregator
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use dir_sizer::config::{CliArgs, RunConfig};
use dir_sizer::progress::{print_header, print_plain, print_summary, ProgressReporter};
use dir_sizer::tree::LocalDir;
use dir_sizer::DirSizer;
use std::process::ExitCode;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = CliArgs::parse();

    setup_logging(args.verbose)?;

    let config = RunConfig::from_args(args).context("Invalid configuration")?;

    if config.show_progress {
        print_header(
            &config.root.display().to_string(),
            config.sizer.max_workers,
            config.sizer.policy,
        );
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to create async runtime")?;

    runtime.block_on(run_async(config))
}

async fn run_async(config: RunConfig) -> Result<()> {
    let sizer = DirSizer::new(config.sizer.clone());

    // Ctrl-C cancels the run; traversals stop at their next checkpoint
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupt received, shutting down...");
        on_interrupt.cancel();
    })
    .context("Failed to set signal handler")?;

    let progress = if config.show_progress {
        Some(ProgressReporter::new())
    } else {
        None
    };

    if let Some(ref p) = progress {
        p.set_status(&format!("Sizing {}...", config.root.display()));
    }

    let start = Instant::now();
    let result = sizer
        .size(&cancel, Box::new(LocalDir::new(&config.root)))
        .await;

    let total = match result {
        Ok(total) => {
            if let Some(ref p) = progress {
                p.finish("Size completed");
            }
            total
        }
        Err(e) => {
            if let Some(ref p) = progress {
                p.finish(if e.is_cancelled() {
                    "Size interrupted"
                } else {
                    "Size failed"
                });
            }
            return Err(e).context(format!("Failed to size '{}'", config.root.display()));
        }
    };

    if config.show_progress {
        print_summary(total, start.elapsed(), config.exact_bytes);
    } else {
        print_plain(total, config.exact_bytes);
    }

    info!(
        files = total.file_count,
        bytes = total.total_size,
        "Done"
    );

    Ok(())
}

fn setup_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("dir_sizer=debug,warn")
    } else {
        EnvFilter::new("dir_sizer=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    Ok(())
}
