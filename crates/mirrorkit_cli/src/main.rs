//! `mirrorkit`: one-way directory mirroring from the command line.

mod cli;
mod config;
mod logging;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use mirrorkit_io_fs::sync_tree;
use tracing::{error, info};

use crate::cli::Cli;
use crate::config::{FileConfig, load_file_config, resolve_settings};

fn run(cli: &Cli) -> Result<bool> {
    let file_config = match &cli.config {
        Some(path_config) => load_file_config(path_config)?,
        None => FileConfig::default(),
    };
    let settings = resolve_settings(cli, file_config)?;

    let report_sync = sync_tree(
        &settings.path_dir_src,
        &settings.path_dir_dst,
        settings.spec_sync_options.clone(),
    )
    .with_context(|| {
        format!(
            "Cannot sync `{}` into `{}`",
            settings.path_dir_src.display(),
            settings.path_dir_dst.display()
        )
    })?;

    let prefix = if settings.spec_sync_options.if_dry_run {
        "[DRY-RUN]"
    } else {
        "[SYNC]"
    };
    println!("{}", report_sync.format(prefix));

    Ok(report_sync.error_count() == 0)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);
    info!("mirrorkit v{}", env!("CARGO_PKG_VERSION"));

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{e:#}");
            ExitCode::from(2)
        }
    }
}
