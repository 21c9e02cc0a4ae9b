//! Command-line interface definition.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "replisync",
    version,
    about = "Mirror a source directory onto a destination, once or on a schedule"
)]
pub struct Cli {
    /// Path of the source directory (must exist)
    #[arg(short, long)]
    pub source: PathBuf,

    /// Path of the destination directory to mirror into
    #[arg(short, long)]
    pub destination: PathBuf,

    /// Re-run the sync every N minutes (fractional values allowed); omit to run once
    #[arg(short, long)]
    pub interval: Option<f64>,

    /// Append log output to this file in addition to stderr
    #[arg(short, long)]
    pub log: Option<PathBuf>,

    /// Create the destination root if it does not exist
    #[arg(long)]
    pub create_dest: bool,

    /// Increase log verbosity (-v: debug, -vv: trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
