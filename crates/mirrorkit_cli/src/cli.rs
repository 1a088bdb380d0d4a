use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "mirrorkit")]
#[command(about = "Make a destination directory an exact mirror of a source directory")]
#[command(version)]
pub struct Cli {
    /// Source directory (overrides `source_root` from the config file)
    pub source: Option<PathBuf>,

    /// Destination directory (overrides `destination_root` from the config file)
    pub destination: Option<PathBuf>,

    /// TOML file providing default values
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Threads per copy worker; also the thread count of the delete phase
    #[arg(long, value_name = "N")]
    pub threads_per_worker: Option<usize>,

    /// Upper bound on concurrent copy workers
    #[arg(long, value_name = "N")]
    pub workers_max: Option<usize>,

    /// Plan and report without touching the filesystem
    #[arg(long)]
    pub dry_run: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}
