//! CLI entry point: parse arguments, wire logging, run once or on a schedule.

use anyhow::{Context, Result};
use clap::Parser;
use replisync::cli::Cli;
use replisync::{Mirror, Scheduler};
use std::fs::OpenOptions;
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        // Completed, but some entries failed; details are in the log
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("replisync: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<bool> {
    init_logging(&cli)?;

    let mirror = Mirror::new(&cli.source, &cli.destination).with_create_dest(cli.create_dest);

    match cli.interval {
        None => {
            let stats = mirror.synchronize()?;
            Ok(stats.errors.is_empty())
        }
        Some(minutes) => {
            anyhow::ensure!(
                minutes.is_finite() && minutes > 0.0,
                "interval must be a positive number of minutes, got {minutes}"
            );
            let scheduler = Scheduler::new(Duration::from_secs_f64(minutes * 60.0))?;

            // Termination is external (process kill); the flag exists so the
            // loop can be wrapped with a shutdown signal
            let stop = Arc::new(AtomicBool::new(false));
            scheduler.run(stop, || {
                if let Err(e) = mirror.synchronize() {
                    tracing::error!("Sync run failed: {}", e);
                }
            });
            Ok(true)
        }
    }
}

/// One structured event stream, consumed by a stderr sink and, when `--log`
/// is given, an append-mode file sink.
fn init_logging(cli: &Cli) -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);
    let registry = tracing_subscriber::registry().with(filter).with(stderr_layer);

    if let Some(path) = &cli.log {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("cannot open log file {}", path.display()))?;
        let file_layer = fmt::layer()
            .with_writer(Arc::new(file))
            .with_ansi(false)
            .with_target(false);
        registry.with(file_layer).init();
    } else {
        registry.init();
    }
    Ok(())
}
