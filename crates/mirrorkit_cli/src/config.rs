use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use mirrorkit_io_fs::{N_THREADS_PER_WORKER_DEFAULT, SpecSyncOptions};
use serde::Deserialize;

use crate::cli::Cli;

/// Values accepted in the `--config` TOML file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub source_root: Option<PathBuf>,
    pub destination_root: Option<PathBuf>,
    pub threads_per_worker: Option<usize>,
    pub dry_run: Option<bool>,
}

/// Fully resolved run settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecRunSettings {
    pub path_dir_src: PathBuf,
    pub path_dir_dst: PathBuf,
    pub spec_sync_options: SpecSyncOptions,
}

pub fn load_file_config(path: &Path) -> Result<FileConfig> {
    let txt = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file `{}`", path.display()))?;
    toml::from_str(&txt)
        .with_context(|| format!("Failed to parse config file `{}`", path.display()))
}

/// Merge command-line values over file values; missing roots are an error.
pub fn resolve_settings(cli: &Cli, file_config: FileConfig) -> Result<SpecRunSettings> {
    let Some(path_dir_src) = cli.source.clone().or(file_config.source_root) else {
        bail!("No source directory given (argument SOURCE or `source_root` in config)");
    };
    let Some(path_dir_dst) = cli.destination.clone().or(file_config.destination_root) else {
        bail!("No destination directory given (argument DESTINATION or `destination_root` in config)");
    };

    let threads_per_worker = cli
        .threads_per_worker
        .or(file_config.threads_per_worker)
        .unwrap_or(N_THREADS_PER_WORKER_DEFAULT);
    let if_dry_run = cli.dry_run || file_config.dry_run.unwrap_or(false);

    Ok(SpecRunSettings {
        path_dir_src,
        path_dir_dst,
        spec_sync_options: SpecSyncOptions {
            threads_per_worker,
            num_workers_max: cli.workers_max,
            if_dry_run,
        },
    })
}
